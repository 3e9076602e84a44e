//! Canonical dashboard layout.
//!
//! The widget list is only ever replaced as a whole: every mutation builds
//! the next list from the current one, resolves the touched widget against
//! it and normalizes the result before swapping it in.

use serde::{Deserialize, Serialize};

use crate::error::{GridError, Result};
use crate::geometry::{GridMetrics, GridPosition, cell_width_for};
use crate::interaction::Commit;
use crate::layout::{NormalizeReport, Placement, normalize_with_report, resolve_detailed};
use crate::widget::{Widget, WidgetId, WidgetKind};

pub const DEFAULT_COLUMNS: u32 = 9;
pub const DEFAULT_ROW_HEIGHT: f64 = 120.0;
pub const MIN_ROW_HEIGHT: f64 = 40.0;
pub const DEFAULT_GAP: f64 = 10.0;

/// Outcome of a single-widget mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutChange {
    pub widget_id: WidgetId,
    /// Where the widget ended up after normalization.
    pub position: GridPosition,
    /// How the resolver placed the proposal.
    pub placement: Placement,
    pub report: NormalizeReport,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardLayout {
    columns: u32,
    row_height: f64,
    gap: f64,
    widgets: Vec<Widget>,
    #[serde(skip)]
    revision: u64,
}

impl Default for DashboardLayout {
    fn default() -> Self {
        Self {
            columns: DEFAULT_COLUMNS,
            row_height: DEFAULT_ROW_HEIGHT,
            gap: DEFAULT_GAP,
            widgets: Vec::new(),
            revision: 0,
        }
    }
}

impl DashboardLayout {
    pub fn new(columns: u32) -> Result<Self> {
        if columns == 0 {
            return Err(GridError::InvalidColumns(columns));
        }
        Ok(Self {
            columns,
            ..Self::default()
        })
    }

    /// Layout over an existing list, taken as-is.
    pub fn with_widgets(mut self, widgets: Vec<Widget>) -> Self {
        self.widgets = widgets;
        self
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    pub fn row_height(&self) -> f64 {
        self.row_height
    }

    pub fn gap(&self) -> f64 {
        self.gap
    }

    pub fn widgets(&self) -> &[Widget] {
        &self.widgets
    }

    pub fn widget(&self, widget_id: &str) -> Option<&Widget> {
        self.widgets.iter().find(|widget| widget.id == widget_id)
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    /// Bumped on every mutation that changed something.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Pixel metrics for a canvas `canvas_width` pixels wide.
    pub fn grid_metrics(&self, canvas_width: f64) -> GridMetrics {
        GridMetrics::new(
            cell_width_for(canvas_width, self.columns, self.gap),
            self.row_height,
            self.gap,
        )
    }

    pub fn set_row_height(&mut self, row_height: f64) {
        let row_height = if row_height.is_finite() {
            row_height.max(MIN_ROW_HEIGHT)
        } else {
            DEFAULT_ROW_HEIGHT
        };
        if row_height != self.row_height {
            self.row_height = row_height;
            self.revision += 1;
        }
    }

    pub fn set_gap(&mut self, gap: f64) {
        let gap = if gap.is_finite() { gap.max(0.0) } else { DEFAULT_GAP };
        if gap != self.gap {
            self.gap = gap;
            self.revision += 1;
        }
    }

    /// Append a template widget of `kind` and return where it landed.
    ///
    /// The id suffix is the first unused number from `len() + 1` upwards.
    pub fn add_widget(&mut self, kind: WidgetKind) -> LayoutChange {
        let existing = self.widgets.len();
        let suffix = (existing + 1..)
            .find(|suffix| {
                let candidate = format!("{}-{suffix}", kind.as_str());
                self.widget(&candidate).is_none()
            })
            .unwrap_or(existing + 1);

        let template = Widget::template(kind, existing, suffix, self.columns);
        let resolution = resolve_detailed(&self.widgets, &template.id, template.position, self.columns);

        let mut next = self.widgets.clone();
        next.push(template.placed_at(resolution.position));
        let report = self.replace(next, true);

        let widget_id = template.id;
        LayoutChange {
            position: self.position_of(&widget_id).unwrap_or(resolution.position),
            widget_id,
            placement: resolution.placement,
            report,
        }
    }

    /// Move or resize one widget. The proposal is resolved against the
    /// current list and the whole list is normalized afterwards.
    pub fn update_position(&mut self, widget_id: &str, proposed: GridPosition) -> Result<LayoutChange> {
        if self.widget(widget_id).is_none() {
            return Err(GridError::WidgetNotFound(widget_id.to_string()));
        }
        let resolution = resolve_detailed(&self.widgets, widget_id, proposed, self.columns);
        let next: Vec<Widget> = self
            .widgets
            .iter()
            .map(|widget| {
                if widget.id == widget_id {
                    widget.placed_at(resolution.position)
                } else {
                    widget.clone()
                }
            })
            .collect();
        let changed = next != self.widgets;
        let report = self.replace(next, changed);

        Ok(LayoutChange {
            widget_id: widget_id.to_string(),
            position: self.position_of(widget_id).unwrap_or(resolution.position),
            placement: resolution.placement,
            report,
        })
    }

    /// Write a gesture result back. The commit is resolved against the
    /// list as it is now, not as it was when the gesture began.
    pub fn apply_commit(&mut self, commit: &Commit) -> Result<LayoutChange> {
        self.update_position(&commit.widget_id, commit.position)
    }

    pub fn remove_widget(&mut self, widget_id: &str) -> Result<Widget> {
        let index = self
            .widgets
            .iter()
            .position(|widget| widget.id == widget_id)
            .ok_or_else(|| GridError::WidgetNotFound(widget_id.to_string()))?;
        let removed = self.widgets.remove(index);
        self.revision += 1;
        Ok(removed)
    }

    /// Change the column count and re-normalize. Setting the same count
    /// twice leaves the list untouched the second time.
    pub fn set_columns(&mut self, columns: u32) -> Result<NormalizeReport> {
        if columns == 0 {
            return Err(GridError::InvalidColumns(columns));
        }
        let resized = columns != self.columns;
        self.columns = columns;
        let (next, report) = normalize_with_report(&self.widgets, self.columns);
        if resized || report.changed() {
            self.widgets = next;
            self.revision += 1;
        }
        Ok(report)
    }

    /// Replace the list with its normalization; true when anything moved.
    pub fn normalize_in_place(&mut self) -> bool {
        let (next, report) = normalize_with_report(&self.widgets, self.columns);
        if report.changed() {
            self.widgets = next;
            self.revision += 1;
        }
        report.changed()
    }

    /// Parse a stored layout. Nothing is normalized.
    pub fn from_json(raw: &str) -> Result<Self> {
        let layout: Self = serde_json::from_str(raw)?;
        if layout.columns == 0 {
            return Err(GridError::InvalidColumns(0));
        }
        Ok(layout)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn position_of(&self, widget_id: &str) -> Option<GridPosition> {
        self.widget(widget_id).map(|widget| widget.position)
    }

    fn replace(&mut self, next: Vec<Widget>, bump: bool) -> NormalizeReport {
        let (normalized, report) = normalize_with_report(&next, self.columns);
        let bump = bump || normalized != self.widgets;
        self.widgets = normalized;
        if bump {
            self.revision += 1;
        }
        report
    }
}
