/// The four views reachable from the sidebar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Page {
    #[default]
    Dashboard,
    History,
    Alerts,
    Settings,
}

impl Page {
    /// Sidebar order.
    pub const ALL: [Page; 4] = [Page::Dashboard, Page::History, Page::Alerts, Page::Settings];

    /// Unknown identifiers select the dashboard.
    pub fn from_id(id: &str) -> Page {
        match id {
            "history" => Page::History,
            "alerts" => Page::Alerts,
            "settings" => Page::Settings,
            _ => Page::Dashboard,
        }
    }

    pub fn id(self) -> &'static str {
        match self {
            Page::Dashboard => "dashboard",
            Page::History => "history",
            Page::Alerts => "alerts",
            Page::Settings => "settings",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Page::Dashboard => "Dashboard",
            Page::History => "Histórico",
            Page::Alerts => "Alertas",
            Page::Settings => "Configurações",
        }
    }

    pub fn href(self) -> String {
        format!("/{}", self.id())
    }
}
