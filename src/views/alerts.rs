use crate::{
    alerts::{detail_path, preview, resolve_path, AlertFilter, StatusFilter},
    history::export::format_timestamp,
    telemetry::models::{Alert, AlertType, Severity},
};

use super::components::{alert_card_class, ErrorPanel, SeverityBadge};

/// Either the filtered alerts or the error panel text.
pub type AlertsOutcome = Result<Vec<Alert>, String>;

fn severity_icon(severity: Severity) -> &'static str {
    match severity {
        Severity::High => "▲",
        Severity::Medium => "●",
        Severity::Low => "ℹ",
    }
}

markup::define! {
    AlertsView<'a>(filter: &'a AlertFilter, outcome: &'a AlertsOutcome) {
        h2 { "Alertas" }
        div.panel {
            h3 { "Filtros de Alertas" }
            p.muted { "Filtre os alertas por gravidade, tipo ou status" }
            form.filters[method = "get", action = "/alerts"] {
                div {
                    label["for" = "severity"] { "Gravidade" }
                    select[id = "severity", name = "severity"] {
                        option[value = "all", selected = filter.severity.is_none()] { "Todas" }
                        @for s in Severity::ALL {
                            option[value = s.as_str(), selected = filter.severity == Some(s)] { @s.label() }
                        }
                    }
                }
                div {
                    label["for" = "alert-type"] { "Tipo" }
                    select[id = "alert-type", name = "type"] {
                        option[value = "all", selected = filter.alert_type.is_none()] { "Todos" }
                        @for t in AlertType::ALL {
                            option[value = t.as_str(), selected = filter.alert_type == Some(t)] { @t.label() }
                        }
                    }
                }
                div {
                    label["for" = "status"] { "Status" }
                    select[id = "status", name = "status"] {
                        @for st in StatusFilter::ALL {
                            option[value = st.as_str(), selected = filter.status == st] { @st.label() }
                        }
                    }
                }
                div {
                    button["type" = "submit"] { "Aplicar Filtros" }
                }
            }
        }
        @match outcome {
            Err(message) => {
                @ErrorPanel { message }
            }
            Ok(alerts) => {
                @if alerts.is_empty() {
                    div."panel empty" {
                        h3 { "Nenhum alerta encontrado" }
                        p.muted { "Não há alertas que correspondam aos filtros selecionados." }
                    }
                } else {
                    @for alert in alerts.iter() {
                        @AlertCard { alert }
                    }
                }
            }
        }
    }

    AlertCard<'a>(alert: &'a Alert) {
        div[class = alert_card_class(alert)] {
            div."alert-card-header" {
                span."severity-icon" { @severity_icon(alert.severity) }
                strong { @alert.message }
                @if alert.resolved {
                    " "
                    span."badge badge-resolved" { "Resolvido" }
                }
            }
            p.muted {
                @format_timestamp(&alert.timestamp) " • " @alert.location
            }
            p { @preview(&alert.description) }
            div."alert-card-actions" {
                @SeverityBadge { severity: alert.severity }
                " "
                a[href = detail_path(&alert.id)] { "Ver detalhes" }
            }
        }
    }

    AlertDetailView<'a>(alert: &'a Alert, notice: Option<&'a str>) {
        p { a[href = "/alerts"] { "← Voltar aos alertas" } }
        @if let Some(text) = notice {
            div.notice { @text }
        }
        div[class = alert_card_class(alert)] {
            h2 {
                span."severity-icon" { @severity_icon(alert.severity) }
                " "
                @alert.message
            }
            p {
                strong { "Data:" } " " @format_timestamp(&alert.timestamp) " (UTC)"
                " • "
                strong { "Local:" } " " @alert.location
                " • "
                strong { "Tipo:" } " " @alert.alert_type.label()
                " "
                @SeverityBadge { severity: alert.severity }
                @if alert.resolved {
                    " "
                    span."badge badge-resolved" { "Resolvido" }
                }
            }
            p."alert-description" { @alert.description }
            @if !alert.resolved {
                form[method = "post", action = resolve_path(&alert.id)] {
                    button["type" = "submit"] { "Marcar como Resolvido" }
                }
            }
        }
    }
}
