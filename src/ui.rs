use crate::charts::Chart;
use crate::models::{Catalog, Project};
use crate::progress::{ProgressState, Source};
use crate::session::{AppModel, Dashboard, Notice, NoticeKind, RegistrationDraft, View};
use maud::{html, Markup, PreEscaped, DOCTYPE};

pub struct Slide {
    pub title: &'static str,
    pub caption: &'static str,
}

pub const SLIDES: [Slide; 3] = [
    Slide {
        title: "Build real systems",
        caption: "Work through a sequence of practical projects, one at a time.",
    },
    Slide {
        title: "Track every task",
        caption: "Check off each stage of a project and watch the charts fill up.",
    },
    Slide {
        title: "Earn your badges",
        caption: "Every finished project is worth 50 points and unlocks the next one.",
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardState {
    Locked,
    Open,
    Completed,
}

pub fn card_state(progress: &ProgressState, index: usize) -> CardState {
    if !progress.is_unlocked(index) {
        CardState::Locked
    } else if progress.is_completed(index) {
        CardState::Completed
    } else {
        CardState::Open
    }
}

/// Resolves a catalog image path against the API server it came from.
pub fn asset_url(base: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") || path.is_empty() {
        return path.to_string();
    }
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

pub fn render_page(model: &AppModel, slide: usize, asset_base: &str) -> String {
    let markup = html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { "Project Portfolio" }
                style { (PreEscaped(STYLE)) }
            }
            body {
                main.app {
                    (render_header(model))
                    @if let Some(notice) = &model.notice {
                        (render_notice(notice))
                    }
                    section.page.active id=(model.view.id()) {
                        @match model.view {
                            View::Login => { (render_login(&model.registration)) }
                            View::Portfolio => { (render_portfolio(model, slide)) }
                            View::Projects => { (render_projects(model, asset_base)) }
                            View::Dashboard => { (render_dashboard(model, asset_base)) }
                        }
                    }
                    @if let (Some(index), Some(catalog)) = (model.research_modal, &model.catalog) {
                        @if let Some(project) = catalog.project(index) {
                            (render_research_modal(project))
                        }
                    }
                    (render_footer(model))
                }
            }
        }
    };
    markup.into_string()
}

fn render_header(model: &AppModel) -> Markup {
    let progress = &model.progress;
    html! {
        header {
            h1 { "Project Portfolio" }
            @if let Some(username) = &model.username {
                p #user-info .subtitle { "Signed in as: " (username) }
            }
            div #points-display .points {
                "Points: " (progress.points) " | Level: " (progress.level())
            }
            div #badges-display .badges {
                @for badge in progress.badges() {
                    span.badge { (badge.label()) }
                }
            }
        }
    }
}

fn render_notice(notice: &Notice) -> Markup {
    match notice.kind {
        NoticeKind::Blocking => html! {
            div.notice.blocking role="alertdialog" {
                div.notice-body {
                    p { (notice.text) }
                    a.btn href="/" { "OK" }
                }
            }
        },
        NoticeKind::Soft => html! {
            div.status data-type="soft" role="status" { (notice.text) }
        },
    }
}

fn render_login(draft: &RegistrationDraft) -> Markup {
    html! {
        div.auth {
            form.panel method="post" action="/login" {
                h2 { "Log in" }
                input #login-username name="username" placeholder="Username" autocomplete="username";
                input #login-password name="password" type="password" placeholder="Password" autocomplete="current-password";
                button.btn type="submit" { "Log in" }
            }
            form.panel method="post" action="/register" {
                h2 { "Create an account" }
                @if let Some(error) = &draft.error {
                    p.form-error { (error) }
                }
                input #reg-username name="username" placeholder="Username" value=(draft.username);
                input #reg-admission name="admission" placeholder="Admission number" value=(draft.admission);
                input #reg-email name="email" type="email" placeholder="Email" value=(draft.email);
                input #reg-password name="password" type="password" placeholder="Password" autocomplete="new-password";
                button.btn type="submit" { "Register" }
            }
        }
    }
}

fn render_portfolio(model: &AppModel, slide: usize) -> Markup {
    let current = &SLIDES[slide % SLIDES.len()];
    html! {
        div.carousel {
            div.carousel-slide.active {
                h2 { (current.title) }
                p { (current.caption) }
            }
            div.carousel-controls {
                form method="post" action="/carousel/prev" { button.tab type="submit" { "‹" } }
                span.hint { (slide % SLIDES.len() + 1) " / " (SLIDES.len()) }
                form method="post" action="/carousel/next" { button.tab type="submit" { "›" } }
            }
        }
        div.actions {
            a.btn href="/projects" { "View projects" }
            @if model.username.is_some() {
                form method="post" action="/progress/reset" onsubmit="return confirm('Reset all progress?');" {
                    button.btn.secondary type="submit" { "Reset progress" }
                }
                form method="post" action="/logout" {
                    button.btn.secondary type="submit" { "Log out" }
                }
            } @else {
                a.btn.secondary href="/login" { "Log in" }
            }
        }
    }
}

fn render_projects(model: &AppModel, asset_base: &str) -> Markup {
    let percent = model.progress.progress_percent(model.project_count());
    html! {
        div.progress {
            div #progress-fill .progress-fill style=(format!("width: {percent}%")) {}
        }
        p #progress-text .hint { (percent) "% Completed" }
        @match &model.catalog {
            Some(catalog) if !catalog.is_empty() => {
                div #projects-container .grid {
                    @for (index, project) in catalog.projects.iter().enumerate() {
                        (render_project_card(&model.progress, index, project, asset_base))
                    }
                }
            }
            _ => {
                p.hint { "Projects are unavailable while the server cannot be reached." }
            }
        }
        div.actions {
            a.btn.secondary href="/portfolio" { "Back to portfolio" }
        }
    }
}

fn render_project_card(
    progress: &ProgressState,
    index: usize,
    project: &Project,
    asset_base: &str,
) -> Markup {
    match card_state(progress, index) {
        CardState::Locked => html! {
            div.card.locked data-index=(index) {
                h3 { (project.name) }
                p { "🔒 Locked" }
            }
        },
        state => html! {
            div.card data-index=(index) {
                @if !project.image.is_empty() {
                    img.project-image src=(asset_url(asset_base, &project.image)) alt=(project.name);
                }
                h3 {
                    (project.name)
                    @if state == CardState::Completed { " ✔" }
                }
                p { (project.description) }
                a.btn href=(format!("/projects/{index}")) { "Open Project" }
            }
        },
    }
}

fn render_dashboard(model: &AppModel, asset_base: &str) -> Markup {
    let (Some(catalog), Some(dashboard)) = (&model.catalog, &model.dashboard) else {
        return html! {
            p.hint { "No project selected." }
            a.btn href="/projects" { "Back to Projects" }
        };
    };
    let Some(project) = catalog.project(dashboard.project) else {
        return html! { a.btn href="/projects" { "Back to Projects" } };
    };
    let tasks = catalog.tasks(dashboard.project);
    let chart = Chart::task_bars(tasks, &dashboard.completion);

    html! {
        div.dashboard {
            div #project-image {
                @if !project.image.is_empty() {
                    img.project-image src=(asset_url(asset_base, &project.image)) alt=(project.name);
                }
            }
            div {
                h2 #project-title { (project.name) }
                p #project-description { (project.description) }
            }
        }
        (render_task_list(dashboard, tasks))
        div.chart-card {
            (chart.render("Completion %"))
        }
        div.actions {
            form method="post" action="/projects/complete" {
                button.btn type="submit" { "Complete Project" }
            }
            a.btn.secondary href="/projects" { "Back to Projects" }
        }
        (render_research_charts(model, catalog))
    }
}

fn render_task_list(dashboard: &Dashboard, tasks: &[String]) -> Markup {
    html! {
        div #task-list .tasks {
            h3 { "Tasks" }
            @if dashboard.source == Some(Source::Local) {
                p.hint { "Showing progress saved on this device." }
            }
            @for (task_index, task) in tasks.iter().enumerate() {
                @let checked = dashboard.completion.get(task_index).copied().unwrap_or(false);
                form.task method="post" action=(format!("/projects/{}/tasks/{task_index}", dashboard.project)) {
                    input type="hidden" name="checked" value=(if checked { "false" } else { "true" });
                    label {
                        input id=(format!("task-{}-{task_index}", dashboard.project)) type="checkbox" checked[checked] onchange="this.form.submit()";
                        " " (task)
                    }
                    noscript { button.tab type="submit" { "Toggle" } }
                }
            }
        }
    }
}

fn render_research_charts(model: &AppModel, catalog: &Catalog) -> Markup {
    html! {
        section #research-charts .grid {
            @for (index, project) in catalog.projects.iter().enumerate() {
                @let percent = model.research.get(index).copied().unwrap_or(0);
                div.chart-card data-index=(index) {
                    div.chart-title { (project.name) }
                    (Chart::done_remaining(percent).render(&project.name))
                    div.chart-meta {
                        a.research-btn href=(format!("/projects/{index}/research")) { "Research" }
                        @if model.progress.is_unlocked(index) {
                            " · "
                            a href=(format!("/projects/{index}")) { "Open project" }
                        }
                    }
                }
            }
        }
    }
}

fn render_research_modal(project: &Project) -> Markup {
    html! {
        div #research-modal .modal aria-hidden="false" {
            div.modal-body {
                h3 #modal-project-title { "Research: " (project.name) }
                div #modal-resources {
                    @if project.resources.is_empty() {
                        div.resource-item { "No resources available." }
                    }
                    @for resource in &project.resources {
                        div.resource-item {
                            a href=(resource.url) target="_blank" rel="noopener noreferrer" { (resource.label) }
                        }
                    }
                }
                form method="post" action="/research/close" {
                    button.btn.modal-close type="submit" { "Close" }
                }
            }
        }
    }
}

fn render_footer(model: &AppModel) -> Markup {
    html! {
        p.hint {
            @match model.last_synced {
                Some(at) => { "Last synced with the server at " (at.format("%H:%M:%S").to_string()) "." }
                None => { "Not synced with the server yet." }
            }
        }
    }
}

const STYLE: &str = r#"
:root {
  --bg-1: #eef3fb;
  --bg-2: #c9d8f2;
  --ink: #1f2a3a;
  --accent: #2a5298;
  --accent-2: #1e3c72;
  --muted: #6b7485;
  --card: rgba(255, 255, 255, 0.9);
  --shadow: 0 24px 60px rgba(30, 60, 114, 0.18);
}

* { box-sizing: border-box; }

body {
  margin: 0;
  min-height: 100vh;
  background: radial-gradient(circle at top, var(--bg-2), transparent 60%),
    linear-gradient(135deg, var(--bg-1), #f6f8fc 60%, #ffffff 100%);
  color: var(--ink);
  font-family: "Trebuchet MS", sans-serif;
  display: grid;
  place-items: center;
  padding: 32px 18px 48px;
}

.app {
  width: min(960px, 100%);
  background: var(--card);
  border-radius: 28px;
  box-shadow: var(--shadow);
  padding: 36px;
  display: grid;
  gap: 24px;
}

header { display: grid; gap: 6px; }
h1 { font-family: "Georgia", serif; margin: 0; font-size: clamp(2rem, 4vw, 2.6rem); }
.subtitle, .hint { margin: 0; color: var(--muted); }
.points { font-weight: 600; color: var(--accent-2); }
.badges { display: flex; gap: 8px; flex-wrap: wrap; }
.badge { background: #fff4d6; border-radius: 999px; padding: 4px 12px; font-size: 0.9rem; }

.auth, .grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(240px, 1fr)); gap: 16px; }
.panel, .card, .chart-card {
  background: white;
  border-radius: 18px;
  padding: 18px;
  border: 1px solid rgba(30, 60, 114, 0.08);
  display: grid;
  gap: 10px;
}
.card.locked { opacity: 0.55; }
.project-image { width: 100%; border-radius: 12px; object-fit: cover; max-height: 160px; }
input { padding: 10px 12px; border-radius: 10px; border: 1px solid #d5dbe6; font-size: 1rem; }
.form-error { color: #c63b2b; margin: 0; }

.btn, button {
  appearance: none;
  border: none;
  border-radius: 999px;
  padding: 12px 18px;
  font-size: 1rem;
  font-weight: 600;
  cursor: pointer;
  background: var(--accent);
  color: white;
  text-decoration: none;
  text-align: center;
}
.btn.secondary { background: var(--accent-2); }
.tab { background: rgba(30, 60, 114, 0.08); color: var(--accent-2); padding: 6px 12px; }
.actions { display: flex; gap: 12px; flex-wrap: wrap; align-items: center; }

.progress { height: 14px; background: #e6e6e6; border-radius: 999px; overflow: hidden; }
.progress-fill { height: 100%; background: var(--accent); }

.carousel { display: grid; gap: 12px; background: white; border-radius: 18px; padding: 24px; }
.carousel-controls { display: flex; gap: 12px; align-items: center; }

.tasks { display: grid; gap: 8px; }
.task label { display: flex; gap: 8px; align-items: center; }
.dashboard { display: grid; grid-template-columns: minmax(160px, 1fr) 2fr; gap: 20px; }

.chart { width: 100%; display: block; }
.chart.doughnut { max-height: 120px; }
.chart-grid { stroke: rgba(30, 60, 114, 0.12); }
.chart-label { fill: var(--muted); font-size: 11px; }
.chart-bar { fill: rgba(42, 82, 152, 0.6); }
.chart-title { font-weight: 600; }
.doughnut-track { fill: none; stroke: #e6e6e6; stroke-width: 14; }
.doughnut-fill { fill: none; stroke: var(--accent); stroke-width: 14; }
.doughnut-value { fill: var(--ink); font-size: 14px; }

.status { font-size: 0.95rem; color: #8a5a00; }
.notice.blocking, .modal {
  position: fixed;
  inset: 0;
  background: rgba(15, 25, 45, 0.45);
  display: grid;
  place-items: center;
}
.notice-body, .modal-body {
  background: white;
  border-radius: 18px;
  padding: 24px;
  display: grid;
  gap: 14px;
  min-width: min(420px, 90vw);
}

@media (max-width: 600px) {
  .app { padding: 28px 20px; }
  .dashboard { grid-template-columns: 1fr; }
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Resource;
    use crate::session::AuthState;

    fn catalog() -> Catalog {
        let project = |name: &str| Project {
            name: name.to_string(),
            description: format!("{name} description"),
            image: "images/p.jpeg".to_string(),
            resources: vec![Resource {
                label: "Guide".to_string(),
                url: "https://example.com/guide".to_string(),
            }],
        };
        Catalog {
            projects: vec![project("Alpha"), project("Beta"), project("Gamma"), project("Delta")],
            project_tasks: vec![
                vec!["Plan".into(), "Build".into()],
                vec!["Plan".into()],
                vec!["Plan".into()],
                vec![],
            ],
        }
    }

    fn model(unlocked_index: usize, completed: &[usize], points: u32) -> AppModel {
        let mut model = AppModel::new(ProgressState {
            unlocked_index,
            completed_projects: completed.iter().copied().collect(),
            points,
        });
        model.catalog = Some(catalog());
        model
    }

    #[test]
    fn card_state_follows_the_frontier() {
        let progress = ProgressState {
            unlocked_index: 1,
            completed_projects: [0].into_iter().collect(),
            points: 50,
        };
        assert_eq!(card_state(&progress, 0), CardState::Completed);
        assert_eq!(card_state(&progress, 1), CardState::Open);
        assert_eq!(card_state(&progress, 2), CardState::Locked);
    }

    #[test]
    fn locked_cards_have_no_action() {
        let mut model = model(1, &[0], 50);
        model.view = View::Projects;
        let page = render_page(&model, 0, "http://api.test");

        assert!(page.contains(r#"href="/projects/0""#));
        assert!(page.contains(r#"href="/projects/1""#));
        assert!(!page.contains(r#"href="/projects/2""#));
        assert!(!page.contains(r#"href="/projects/3""#));
        assert_eq!(page.matches("🔒 Locked").count(), 2);
        assert!(page.contains("Alpha ✔"));
        assert!(page.contains("50% Completed"));
        assert!(page.contains("http://api.test/images/p.jpeg"));
    }

    #[test]
    fn header_shows_level_and_badges() {
        let mut model = model(2, &[0, 1], 100);
        model.username = Some("demo".to_string());
        model.auth = AuthState::LoggedIn;
        let page = render_page(&model, 0, "");

        assert!(page.contains("Signed in as: demo"));
        assert!(page.contains("Points: 100 | Level: 2"));
        assert!(page.contains("Beginner"));
        assert!(page.contains("Intermediate"));
        assert!(!page.contains("Expert"));
    }

    #[test]
    fn dashboard_renders_checklist_and_charts() {
        let mut model = model(0, &[], 0);
        model.view = View::Dashboard;
        model.current_project = Some(0);
        model.dashboard = Some(Dashboard {
            project: 0,
            completion: vec![true, false],
            source: Some(Source::Local),
        });
        model.research = vec![50, 0, 0, 0];
        let page = render_page(&model, 0, "");

        assert!(page.contains(r#"action="/projects/0/tasks/0""#));
        assert!(page.contains(r#"action="/projects/0/tasks/1""#));
        assert!(page.contains(r#"id="task-0-0" type="checkbox" checked"#));
        assert!(page.contains("Showing progress saved on this device."));
        assert!(page.contains("50%"));
        assert_eq!(page.matches("research-btn").count(), 4);
    }

    #[test]
    fn research_modal_lists_resources() {
        let mut model = model(0, &[], 0);
        model.research_modal = Some(3);
        let page = render_page(&model, 0, "");
        assert!(page.contains("Research: Delta"));
        assert!(page.contains("https://example.com/guide"));
    }

    #[test]
    fn notices_render_by_kind() {
        let mut model = model(0, &[], 0);
        model.notice = Some(Notice::blocking("Invalid credentials"));
        let page = render_page(&model, 0, "");
        assert!(page.contains("alertdialog"));
        assert!(page.contains("Invalid credentials"));

        model.notice = Some(Notice::soft("Task saved locally (server unavailable)."));
        let page = render_page(&model, 0, "");
        assert!(page.contains(r#"data-type="soft""#));
    }

    #[test]
    fn user_text_is_escaped() {
        let mut model = model(0, &[], 0);
        model.username = Some("<b>mallory</b>".to_string());
        let page = render_page(&model, 0, "");
        assert!(page.contains("&lt;b&gt;mallory&lt;/b&gt;"));
    }

    #[test]
    fn asset_urls_resolve_against_the_api() {
        assert_eq!(asset_url("http://api.test/", "images/a.jpeg"), "http://api.test/images/a.jpeg");
        assert_eq!(asset_url("http://api.test", "/images/a.jpeg"), "http://api.test/images/a.jpeg");
        assert_eq!(asset_url("http://api.test", "https://cdn.test/a.jpeg"), "https://cdn.test/a.jpeg");
    }
}
