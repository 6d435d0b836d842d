//! Chart assembly on top of the plotly crate
//!
//! One `Scatter3D` line trace per (group, line) plus a button-style update
//! menu. Each button carries a visibility mask over the full trace list and a
//! replacement chart title.

use plotly::common::{Line, Mode, Title};
use plotly::layout::update_menu::{Button, ButtonMethod, UpdateMenu, UpdateMenuDirection, UpdateMenuType};
use plotly::{Layout, Plot, Scatter3D};
use serde_json::json;

use crate::config::ChartConfig;
use crate::dataset::Dataset;
use crate::palette;

/// Title shown when every group is visible
pub const ALL_GROUPS_TITLE: &str = "Showing All Groups";

/// What one update-menu button does
#[derive(Debug, Clone, PartialEq)]
pub struct Toggle {
    pub label: String,
    pub title: String,
    pub visible: Vec<bool>,
}

impl Toggle {
    pub fn shown(&self) -> usize {
        self.visible.iter().filter(|&&v| v).count()
    }

    /// `update` applies the trace args, then the layout args
    pub fn to_button(&self) -> Button {
        Button::new()
            .label(&self.label)
            .method(ButtonMethod::Update)
            .args(json!([{ "visible": self.visible }, { "title": self.title }]))
    }
}

/// One trace per (group, line), group-major.
///
/// The trace for line `i` of group `g` sits at index `g * lines_per_group + i`.
pub fn build_traces(dataset: &Dataset, chart: &ChartConfig) -> Vec<Box<Scatter3D<f64, f64, f64>>> {
    let mut traces = Vec::with_capacity(dataset.num_groups * dataset.lines_per_group);

    for group in dataset.groups() {
        let color = palette::color_for(&chart.palette, group);
        for i in 0..dataset.lines_per_group {
            let seg = dataset.line_segment(group, i);
            let name = format!("Group {} Line {}", group, i + 1);
            let trace = Scatter3D::new(seg.x.to_vec(), seg.y.to_vec(), seg.z.to_vec())
                .mode(Mode::Lines)
                .line(Line::new().color(color.to_string()))
                .name(&name);
            traces.push(trace);
        }
    }

    tracing::debug!("Built {} traces", traces.len());
    traces
}

/// Mask that shows exactly the traces of one group
pub fn visibility_mask(group: usize, lines_per_group: usize, trace_count: usize) -> Vec<bool> {
    let mut visible = vec![false; trace_count];
    let start = group.saturating_mul(lines_per_group).min(trace_count);
    let end = start.saturating_add(lines_per_group).min(trace_count);
    visible[start..end].iter_mut().for_each(|v| *v = true);
    visible
}

/// One toggle per group, then an "All" toggle
pub fn group_toggles(dataset: &Dataset, trace_count: usize) -> Vec<Toggle> {
    let mut toggles: Vec<Toggle> = dataset
        .groups()
        .into_iter()
        .map(|group| Toggle {
            label: format!("Group {}", group),
            title: format!("Showing Group {}", group),
            visible: visibility_mask(group, dataset.lines_per_group, trace_count),
        })
        .collect();

    toggles.push(Toggle {
        label: "All".to_string(),
        title: ALL_GROUPS_TITLE.to_string(),
        visible: vec![true; trace_count],
    });

    toggles
}

pub fn build_buttons(toggles: &[Toggle]) -> Vec<Button> {
    toggles.iter().map(Toggle::to_button).collect()
}

/// The assembled chart plus the toggle table it was built from
pub struct Figure {
    plot: Plot,
    trace_count: usize,
    toggles: Vec<Toggle>,
}

impl Figure {
    pub fn build(dataset: &Dataset, chart: &ChartConfig) -> Self {
        let traces = build_traces(dataset, chart);
        let trace_count = traces.len();
        let toggles = group_toggles(dataset, trace_count);

        let mut plot = Plot::new();
        if !chart.embed_plotly_js {
            plot.use_cdn_plotly();
        }
        for trace in traces {
            plot.add_trace(trace);
        }

        let menu = UpdateMenu::new()
            .ty(UpdateMenuType::Buttons)
            .direction(UpdateMenuDirection::Down)
            .show_active(true)
            .buttons(build_buttons(&toggles));

        let mut layout = Layout::new()
            .title(Title::with_text(&chart.title))
            .show_legend(true)
            .update_menus(vec![menu]);
        if let Some(height) = chart.height {
            layout = layout.height(height);
        }
        plot.set_layout(layout);

        Self {
            plot,
            trace_count,
            toggles,
        }
    }

    pub fn plot(&self) -> &Plot {
        &self.plot
    }

    pub fn trace_count(&self) -> usize {
        self.trace_count
    }

    pub fn toggles(&self) -> &[Toggle] {
        &self.toggles
    }

    /// `{data, layout, config}` as consumed by `Plotly.newPlot`
    pub fn to_json(&self) -> String {
        self.plot.to_json()
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        let value: serde_json::Value = serde_json::from_str(&self.plot.to_json())?;
        serde_json::to_string_pretty(&value)
    }
}
