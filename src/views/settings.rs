use crate::settings::{Language, Settings, Theme, REFRESH_INTERVALS, SESSION_TIMEOUTS};

use super::components::ErrorPanel;

/// Feedback shown above the settings form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsNotice {
    Saved,
    Restored,
    Invalid(String),
}

fn refresh_label(secs: u64) -> String {
    match secs {
        s if s % 60 == 0 && s >= 60 => match s / 60 {
            1 => "1 minuto".to_owned(),
            m => format!("{m} minutos"),
        },
        s => format!("{s} segundos"),
    }
}

fn timeout_label(mins: u32) -> String {
    match mins {
        m if m % 60 == 0 && m >= 60 => match m / 60 {
            1 => "1 hora".to_owned(),
            h => format!("{h} horas"),
        },
        m => format!("{m} minutos"),
    }
}

markup::define! {
    SettingsView<'a>(settings: &'a Settings, notice: Option<&'a SettingsNotice>) {
        h2 { "Configurações" }
        p.muted { "Gerir as configurações do sistema AgroChain" }
        @match notice {
            Some(SettingsNotice::Saved) => {
                div.notice { "Configurações guardadas." }
            }
            Some(SettingsNotice::Restored) => {
                div.notice { "Configurações padrão restauradas." }
            }
            Some(SettingsNotice::Invalid(message)) => {
                @ErrorPanel { message }
            }
            None => {}
        }
        form[id = "settings-form", method = "post", action = "/settings"] {
            div.panel {
                h3 { "Aparência" }
                div."settings-row" {
                    label["for" = "theme"] { "Tema" }
                    select[id = "theme", name = "theme"] {
                        @for t in Theme::ALL {
                            option[value = t.as_str(), selected = settings.theme == t] { @t.label() }
                        }
                    }
                }
                div."settings-row" {
                    label["for" = "language"] { "Idioma" }
                    select[id = "language", name = "language"] {
                        @for l in Language::ALL {
                            option[value = l.as_str(), selected = settings.language == l] { @l.label() }
                        }
                    }
                }
            }
            div.panel {
                h3 { "Notificações" }
                @Switch { name: "temperature_alerts", text: "Alertas de Temperatura", checked: settings.temperature_alerts }
                @Switch { name: "humidity_alerts", text: "Alertas de Humidade", checked: settings.humidity_alerts }
                @Switch { name: "email_alerts", text: "E-mail de Alertas", checked: settings.email_alerts }
                div."settings-row" {
                    label["for" = "alert_email"] { "E-mail para Alertas" }
                    input[id = "alert_email", "type" = "email", name = "alert_email", placeholder = "seu@email.com", value = settings.alert_email.as_str()];
                }
            }
            div.panel {
                h3 { "Sistema" }
                div."settings-row" {
                    label["for" = "api_url"] { "URL da API" }
                    input[id = "api_url", name = "api_url", placeholder = "https://api.agrochain.com", value = settings.api_url.as_str()];
                    p.muted { "Endereço base da API para comunicação com os sensores" }
                }
                div."settings-row" {
                    label["for" = "refresh_interval"] { "Taxa de Atualização (segundos)" }
                    select[id = "refresh_interval", name = "refresh_interval"] {
                        @for secs in REFRESH_INTERVALS {
                            option[value = secs.to_string(), selected = settings.refresh_interval_secs == secs] { @refresh_label(secs) }
                        }
                    }
                    p.muted { "Frequência de atualização dos dados dos sensores" }
                }
                @Switch { name: "developer_mode", text: "Modo de Desenvolvimento", checked: settings.developer_mode }
            }
            div.panel {
                h3 { "Segurança" }
                @Switch { name: "two_factor", text: "Autenticação de Dois Fatores", checked: settings.two_factor }
                div."settings-row" {
                    label["for" = "session_timeout"] { "Timeout de Sessão (minutos)" }
                    select[id = "session_timeout", name = "session_timeout"] {
                        @for mins in SESSION_TIMEOUTS {
                            option[value = mins.to_string(), selected = settings.session_timeout_mins == mins] { @timeout_label(mins) }
                        }
                    }
                }
            }
        }
        div.actions {
            form[method = "post", action = "/settings/reset"] {
                button["type" = "submit"] { "Restaurar Padrões" }
            }
            button["type" = "submit", form = "settings-form"] { "Guardar Configurações" }
        }
    }

    Switch<'a>(name: &'a str, text: &'a str, checked: bool) {
        div."settings-row" {
            label {
                input["type" = "checkbox", name = name, checked = *checked];
                " "
                @text
            }
        }
    }
}
