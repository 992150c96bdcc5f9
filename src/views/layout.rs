//! Page shell: head, header with the theme switch, and the sidebar.

use crate::{pages::Page, settings::Theme};

/// What the shell needs to know about the current request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutContext {
    pub page: Page,
    pub theme: Theme,
    /// Adds `<meta http-equiv="refresh">` with this many seconds.
    pub refresh_secs: Option<u64>,
}

impl LayoutContext {
    pub fn new(page: Page, theme: Theme) -> Self {
        Self {
            page,
            theme,
            refresh_secs: None,
        }
    }

    pub fn with_refresh(self, secs: u64) -> Self {
        Self {
            refresh_secs: Some(secs),
            ..self
        }
    }

    fn body_class(&self) -> String {
        format!("theme-{}", self.theme)
    }

    fn nav_class(&self, page: Page) -> &'static str {
        if page == self.page {
            "nav-item active"
        } else {
            "nav-item"
        }
    }

    fn toggle_label(&self) -> &'static str {
        match self.theme.toggled() {
            Theme::Light => "☀ Claro",
            _ => "☾ Escuro",
        }
    }
}

const STYLE: &str = r#"
:root { --bg: #f0fdf4; --fg: #111827; --card: #ffffff; --muted: #6b7280; --accent: #16a34a; --border: #e5e7eb; }
body.theme-dark { --bg: #111827; --fg: #f3f4f6; --card: #1f2937; --muted: #9ca3af; --accent: #4ade80; --border: #374151; }
@media (prefers-color-scheme: dark) {
  body.theme-system { --bg: #111827; --fg: #f3f4f6; --card: #1f2937; --muted: #9ca3af; --accent: #4ade80; --border: #374151; }
}
* { box-sizing: border-box; }
body { margin: 0; display: flex; min-height: 100vh; font-family: system-ui, sans-serif; background: var(--bg); color: var(--fg); }
a { color: var(--accent); }
.sidebar { width: 240px; padding: 24px; border-right: 1px solid var(--border); }
.sidebar ul { list-style: none; padding: 0; }
.nav-item { display: block; padding: 10px 12px; border-radius: 8px; text-decoration: none; color: var(--fg); }
.nav-item.active { border-left: 4px solid var(--accent); font-weight: 600; }
main { flex: 1; display: flex; flex-direction: column; }
.header { display: flex; justify-content: space-between; align-items: center; padding: 12px 24px; border-bottom: 1px solid var(--border); }
.header h1 { margin: 0; font-size: 1.5rem; }
.content { padding: 24px; }
.muted, .sensor-unit { color: var(--muted); font-size: 0.85rem; }
.cards-grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(220px, 1fr)); gap: 16px; }
.charts-grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(420px, 1fr)); gap: 16px; margin-top: 16px; }
.sensor-card, .chart-card, .panel, .alert-card { background: var(--card); border-radius: 12px; padding: 16px; box-shadow: 0 2px 6px rgba(0,0,0,.08); }
.sensor-card-body { display: flex; justify-content: space-between; align-items: baseline; }
.sensor-value { font-size: 2rem; font-weight: 700; }
.trend { padding: 2px 8px; border-radius: 999px; font-size: 0.75rem; }
.trend-up { background: #dcfce7; color: #166534; }
.trend-down { background: #fee2e2; color: #991b1b; }
.trend-stable { background: #f3f4f6; color: #1f2937; }
.chart { width: 100%; height: 240px; }
.chart-axis { display: flex; justify-content: space-between; color: var(--muted); font-size: 0.75rem; }
.alert-banner-item, .error-panel { background: #fef2f2; color: #991b1b; border: 1px solid #fecaca; border-radius: 8px; padding: 12px; margin-bottom: 8px; }
.alert-banner-item { display: flex; gap: 8px; align-items: center; }
.banner-dismiss { margin-left: auto; }
.banner-dismiss button { background: none; border: none; color: inherit; font-size: 1.1em; cursor: pointer; }
.badge { padding: 2px 8px; border-radius: 999px; font-size: 0.75rem; border: 1px solid; }
.badge-high { background: #fee2e2; color: #991b1b; }
.badge-medium { background: #fef9c3; color: #854d0e; }
.badge-low { background: #dbeafe; color: #1e40af; }
.badge-resolved { background: #dcfce7; color: #166534; }
.alert-card { margin-bottom: 12px; }
.alert-card.resolved { opacity: .75; }
.filters { display: flex; flex-wrap: wrap; gap: 12px; align-items: flex-end; }
.filters label, .settings-row label { display: block; font-weight: 600; margin-bottom: 4px; }
table { width: 100%; border-collapse: collapse; }
th, td { text-align: left; padding: 8px; border-bottom: 1px solid var(--border); }
td.num { font-family: monospace; }
.placeholder { height: 16px; background: var(--border); border-radius: 4px; margin: 8px 0; }
.placeholder.wide { height: 32px; }
.settings-row { margin: 12px 0; }
.actions { display: flex; gap: 12px; justify-content: flex-end; }
.notice { background: #dcfce7; color: #166534; border-radius: 8px; padding: 12px; }
"#;

markup::define! {
    Layout<'a>(ctx: &'a LayoutContext, body: &'a str) {
        @markup::doctype()
        html[lang = "pt"] {
            head {
                meta[charset = "utf-8"];
                meta[name = "viewport", content = "width=device-width, initial-scale=1"];
                @if let Some(secs) = ctx.refresh_secs {
                    meta["http-equiv" = "refresh", content = secs.to_string()];
                }
                title { @ctx.page.title() " · AgroChain Monitor" }
                style { @markup::raw(STYLE) }
            }
            body[class = ctx.body_class()] {
                aside.sidebar {
                    div.brand {
                        h2 { "AgroChain" }
                        p.muted { "Sistema de Monitoramento" }
                    }
                    nav {
                        ul {
                            @for page in Page::ALL {
                                li {
                                    a[href = page.href(), class = ctx.nav_class(page)] { @page.title() }
                                }
                            }
                        }
                    }
                }
                main {
                    header.header {
                        div {
                            h1 { "AgroChain Monitor" }
                            p.muted { "Monitoramento Agrícola em Tempo Real" }
                        }
                        form[method = "post", action = "/theme"] {
                            input["type" = "hidden", name = "page", value = ctx.page.id()];
                            button["type" = "submit", class = "theme-toggle"] { @ctx.toggle_label() }
                        }
                    }
                    div.content {
                        @markup::raw(body)
                    }
                }
            }
        }
    }
}
