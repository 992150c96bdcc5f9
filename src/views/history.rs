use crate::{
    history::{export, HistoryFilterParams, LOCATIONS},
    telemetry::models::HistoryRecord,
};

use super::components::ErrorPanel;

/// Either the records to list or the error panel text.
pub type HistoryOutcome = Result<Vec<HistoryRecord>, String>;

fn location_selected(params: &HistoryFilterParams, value: &str) -> bool {
    let current = params
        .location
        .as_deref()
        .filter(|l| !l.is_empty())
        .unwrap_or("all");
    current == value
}

fn date_value(raw: &Option<String>) -> &str {
    raw.as_deref().unwrap_or("")
}

markup::define! {
    HistoryView<'a>(params: &'a HistoryFilterParams, outcome: &'a HistoryOutcome) {
        h2 { "Histórico" }
        div.panel {
            h3 { "Filtros" }
            p.muted { "Filtre os dados históricos por período ou localização" }
            form.filters[method = "get", action = "/history"] {
                div {
                    label["for" = "location"] { "Localização" }
                    select[id = "location", name = "location"] {
                        option[value = "all", selected = location_selected(params, "all")] { "Todas" }
                        @for location in LOCATIONS {
                            option[value = location, selected = location_selected(params, location)] { @location }
                        }
                    }
                }
                div {
                    label["for" = "dateFrom"] { "Data Inicial" }
                    input[id = "dateFrom", "type" = "date", name = "dateFrom", value = date_value(&params.date_from)];
                }
                div {
                    label["for" = "dateTo"] { "Data Final" }
                    input[id = "dateTo", "type" = "date", name = "dateTo", value = date_value(&params.date_to)];
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
            Ok(records) => {
                @HistoryTable { records }
            }
        }
    }

    HistoryTable<'a>(records: &'a [HistoryRecord]) {
        div.panel {
            div."panel-header" {
                h3 { "Histórico de Dados" }
                p.muted { @records.len() " registros encontrados" }
                a.button[href = "/history/export"] { "⤓ Exportar CSV" }
            }
            table {
                thead {
                    tr {
                        @for title in export::HEADER {
                            th { @title }
                        }
                    }
                }
                tbody {
                    @for record in records.iter() {
                        @HistoryRow { cells: &export::row(record) }
                    }
                }
            }
        }
    }

    HistoryRow<'a>(cells: &'a [String; 10]) {
        tr {
            @for (i, cell) in cells.iter().enumerate() {
                @if i < 2 {
                    td { @cell }
                } else {
                    td.num { @cell }
                }
            }
        }
    }
}
