//! Widget records as the placement engine sees them.
//!
//! The engine only ever rewrites `position`. Everything type-specific
//! (state ids, stream urls, colours) rides along in `extra` untouched so the
//! external config store gets back exactly what it handed in.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::geometry::GridPosition;

/// Opaque widget identity.
pub type WidgetId = String;

/// Widget families known to the dashboard. Unknown families deserialize to
/// [`WidgetKind::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetKind {
    State,
    Camera,
    Energy,
    Solar,
    Grafana,
    Weather,
    #[serde(other)]
    Other,
}

impl WidgetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WidgetKind::State => "state",
            WidgetKind::Camera => "camera",
            WidgetKind::Energy => "energy",
            WidgetKind::Solar => "solar",
            WidgetKind::Grafana => "grafana",
            WidgetKind::Weather => "weather",
            WidgetKind::Other => "other",
        }
    }

    /// Ordering used by the responsive projector; lower goes first.
    pub fn priority(&self) -> u8 {
        match self {
            WidgetKind::State => 0,
            WidgetKind::Weather => 1,
            WidgetKind::Camera => 2,
            WidgetKind::Energy => 3,
            WidgetKind::Solar => 4,
            WidgetKind::Grafana => 5,
            WidgetKind::Other => 10,
        }
    }

    /// Default `(w, h)` for a freshly added widget on a `columns`-wide grid.
    pub fn template_size(&self, columns: u32) -> (f64, f64) {
        let columns = f64::from(columns.max(1));
        match self {
            WidgetKind::State => (1.0, 1.0),
            WidgetKind::Camera => (columns.min(6.0), 4.0),
            WidgetKind::Energy => (columns.min(6.0), 3.0),
            WidgetKind::Solar => (columns.min(8.0), 4.0),
            WidgetKind::Grafana => (columns.min(6.0), 3.0),
            WidgetKind::Weather | WidgetKind::Other => (columns.min(3.0), 2.0),
        }
    }

    fn title_stem(&self) -> &'static str {
        match self {
            WidgetKind::State => "Switch",
            WidgetKind::Camera => "Camera",
            WidgetKind::Energy => "Energy",
            WidgetKind::Solar => "Solar",
            WidgetKind::Grafana => "Grafana",
            WidgetKind::Weather => "Weather",
            WidgetKind::Other => "Widget",
        }
    }

    fn template_fields(&self, suffix: usize) -> Map<String, Value> {
        let fields = match self {
            WidgetKind::State => json!({
                "stateId": format!("0_userdata.0.widgets.state_{suffix}"),
                "writeable": true,
                "onLabel": "On",
                "offLabel": "Off",
            }),
            WidgetKind::Camera => json!({
                "snapshotUrl": "",
                "rtspUrl": "rtsp://camera.local:554/stream1",
                "refreshMs": 2000,
            }),
            WidgetKind::Energy => json!({
                "pvStateId": format!("0_userdata.0.energy_{suffix}.pv"),
                "houseStateId": format!("0_userdata.0.energy_{suffix}.house"),
                "batteryStateId": format!("0_userdata.0.energy_{suffix}.battery"),
                "gridStateId": format!("0_userdata.0.energy_{suffix}.grid"),
            }),
            WidgetKind::Solar => json!({
                "statePrefix": format!("0_userdata.0.solar_{suffix}"),
                "dailyEnergyUnit": "auto",
            }),
            WidgetKind::Grafana => json!({ "url": "", "refreshMs": 60000 }),
            WidgetKind::Weather => json!({ "latitude": 0.0, "longitude": 0.0, "refreshMs": 600000 }),
            WidgetKind::Other => json!({}),
        };
        match fields {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }
}

impl fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A dashboard widget. Only `position` is owned by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Widget {
    pub id: WidgetId,
    #[serde(rename = "type")]
    pub kind: WidgetKind,
    #[serde(default)]
    pub title: String,
    pub position: GridPosition,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Widget {
    pub fn new(id: impl Into<WidgetId>, kind: WidgetKind, position: GridPosition) -> Self {
        Self {
            id: id.into(),
            kind,
            title: String::new(),
            position,
            extra: Map::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Copy of this widget at another position.
    pub fn placed_at(&self, position: GridPosition) -> Self {
        Self {
            position,
            ..self.clone()
        }
    }

    /// New widget for the add-widget flow.
    ///
    /// `existing` is the number of widgets already on the dashboard; the
    /// widget starts at `{x: 0, y: existing + 2}` with its kind's default
    /// size. `suffix` picks the numbering used in the id and title.
    pub fn template(kind: WidgetKind, existing: usize, suffix: usize, columns: u32) -> Self {
        let (w, h) = kind.template_size(columns);
        let position = GridPosition::new(0.0, existing as f64 + 2.0, w, h);
        Self {
            id: format!("{}-{suffix}", kind.as_str()),
            kind,
            title: format!("{} {suffix}", kind.title_stem()),
            position,
            extra: kind.template_fields(suffix),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_kind_deserializes_as_other() {
        let raw = r#"{"id":"x","type":"clock","position":{"x":0,"y":0,"w":1,"h":1}}"#;
        let widget: Widget = serde_json::from_str(raw).unwrap();
        assert_eq!(widget.kind, WidgetKind::Other);
        assert_eq!(widget.title, "");
    }

    #[test]
    fn type_specific_fields_round_trip() {
        let raw = r#"{"id":"s1","type":"state","title":"Lamp","position":{"x":1,"y":2,"w":1,"h":1},"stateId":"hue.0.lamp","writeable":true}"#;
        let widget: Widget = serde_json::from_str(raw).unwrap();
        assert_eq!(widget.extra.get("stateId"), Some(&json!("hue.0.lamp")));

        let value = serde_json::to_value(&widget).unwrap();
        assert_eq!(value["type"], json!("state"));
        assert_eq!(value["writeable"], json!(true));
        assert_eq!(value["position"]["y"], json!(2.0));
    }

    #[test]
    fn template_places_below_existing_rows() {
        let widget = Widget::template(WidgetKind::State, 3, 4, 9);
        assert_eq!(widget.id, "state-4");
        assert_eq!(widget.title, "Switch 4");
        assert_eq!(widget.position, GridPosition::new(0.0, 5.0, 1.0, 1.0));
        assert!(widget.extra.contains_key("stateId"));
    }

    #[test]
    fn template_width_is_capped_by_columns() {
        let widget = Widget::template(WidgetKind::Solar, 0, 1, 4);
        assert_eq!(widget.position.w, 4.0);
        assert_eq!(widget.position.h, 4.0);
    }

    #[test]
    fn priorities_follow_dashboard_reading_order() {
        let mut kinds = vec![
            WidgetKind::Grafana,
            WidgetKind::Other,
            WidgetKind::State,
            WidgetKind::Solar,
            WidgetKind::Camera,
            WidgetKind::Weather,
            WidgetKind::Energy,
        ];
        kinds.sort_by_key(|kind| kind.priority());
        assert_eq!(
            kinds,
            vec![
                WidgetKind::State,
                WidgetKind::Weather,
                WidgetKind::Camera,
                WidgetKind::Energy,
                WidgetKind::Solar,
                WidgetKind::Grafana,
                WidgetKind::Other,
            ]
        );
    }
}
