use maud::{html, Markup};

const BAR_WIDTH: f64 = 600.0;
const BAR_HEIGHT: f64 = 260.0;
const PADDING_X: f64 = 44.0;
const PADDING_Y: f64 = 34.0;
const TOP: f64 = 24.0;
const DOUGHNUT_RADIUS: f64 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Bar,
    Doughnut,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub kind: ChartKind,
    pub labels: Vec<String>,
    pub series: Vec<f64>,
}

impl Chart {
    pub fn task_bars(tasks: &[String], completion: &[bool]) -> Self {
        let series = tasks
            .iter()
            .enumerate()
            .map(|(index, _)| {
                if completion.get(index).copied().unwrap_or(false) {
                    100.0
                } else {
                    0.0
                }
            })
            .collect();
        Self {
            kind: ChartKind::Bar,
            labels: tasks.to_vec(),
            series,
        }
    }

    pub fn done_remaining(percent: u32) -> Self {
        let done = f64::from(percent.min(100));
        Self {
            kind: ChartKind::Doughnut,
            labels: vec!["Done".to_string(), "Remaining".to_string()],
            series: vec![done, 100.0 - done],
        }
    }

    pub fn render(&self, title: &str) -> Markup {
        match self.kind {
            ChartKind::Bar => self.render_bars(title),
            ChartKind::Doughnut => self.render_doughnut(title),
        }
    }

    fn render_bars(&self, title: &str) -> Markup {
        if self.series.is_empty() {
            return html! {
                svg.chart viewBox=(format!("0 0 {BAR_WIDTH} {BAR_HEIGHT}")) role="img" aria-label=(title) {
                    text.chart-label x="50%" y="50%" text-anchor="middle" { "No tasks yet" }
                }
            };
        }

        let plot_height = BAR_HEIGHT - TOP - PADDING_Y;
        let slot = (BAR_WIDTH - PADDING_X * 2.0) / self.series.len() as f64;
        let bar_width = slot * 0.6;
        let y = |value: f64| BAR_HEIGHT - PADDING_Y - value.clamp(0.0, 100.0) / 100.0 * plot_height;

        html! {
            svg.chart viewBox=(format!("0 0 {BAR_WIDTH} {BAR_HEIGHT}")) role="img" aria-label=(title) {
                @for tick in [0.0, 25.0, 50.0, 75.0, 100.0] {
                    line.chart-grid x1=(format!("{PADDING_X}")) y1=(format!("{:.2}", y(tick))) x2=(format!("{}", BAR_WIDTH - PADDING_X)) y2=(format!("{:.2}", y(tick))) {}
                    text.chart-label x=(format!("{}", PADDING_X - 10.0)) y=(format!("{:.2}", y(tick) + 4.0)) text-anchor="end" { (format!("{tick}")) }
                }
                @for (index, (label, value)) in self.labels.iter().zip(&self.series).enumerate() {
                    @let x = PADDING_X + slot * index as f64 + (slot - bar_width) / 2.0;
                    rect.chart-bar x=(format!("{x:.2}")) y=(format!("{:.2}", y(*value)))
                        width=(format!("{bar_width:.2}")) height=(format!("{:.2}", BAR_HEIGHT - PADDING_Y - y(*value))) {
                        title { (label) ": " (format!("{value}")) "%" }
                    }
                    text.chart-label x=(format!("{:.2}", x + bar_width / 2.0)) y=(format!("{}", BAR_HEIGHT - PADDING_Y + 18.0)) text-anchor="middle" {
                        (label)
                    }
                }
            }
        }
    }

    fn render_doughnut(&self, title: &str) -> Markup {
        let done = self.series.first().copied().unwrap_or(0.0).clamp(0.0, 100.0);
        let circumference = 2.0 * std::f64::consts::PI * DOUGHNUT_RADIUS;
        let filled = circumference * done / 100.0;

        html! {
            svg.chart.doughnut viewBox="0 0 100 100" role="img" aria-label=(title) {
                circle.doughnut-track cx="50" cy="50" r=(format!("{DOUGHNUT_RADIUS}")) {}
                circle.doughnut-fill cx="50" cy="50" r=(format!("{DOUGHNUT_RADIUS}"))
                    stroke-dasharray=(format!("{filled:.2} {circumference:.2}"))
                    transform="rotate(-90 50 50)" {}
                text.doughnut-value x="50" y="55" text-anchor="middle" { (format!("{done}")) "%" }
            }
        }
    }
}
