//! Zone-partitioned displays.
//!
//! Each widget stays in the zone holding its canonical center. Inside a zone
//! the canonical section is rescaled onto a 3-column local grid and
//! normalized; the zones are then laid side by side or stacked.

use crate::geometry::GridPosition;
use crate::layout::{PRIMARY_SECTION_COUNT, normalize, section_index, section_width};
use crate::widget::Widget;

use super::{DISPLAY_ZONE_WIDTH, DisplayWidget, ZONE_STACK_GAP, ZoneArrangement, ZoneBand};

pub(crate) fn pack_zones(
    ordered: &[&Widget],
    canonical_columns: u32,
    arrangement: ZoneArrangement,
) -> (Vec<DisplayWidget>, Vec<ZoneBand>) {
    let section = section_width(canonical_columns);
    let ratio = DISPLAY_ZONE_WIDTH as f64 / section;

    let mut zones: Vec<Vec<Widget>> = vec![Vec::new(); PRIMARY_SECTION_COUNT];
    for widget in ordered {
        let canonical = widget.position.finite_or_default();
        let zone = section_index(canonical.center_x(), canonical_columns);
        let start = zone as f64 * section;
        let local = GridPosition {
            x: (canonical.x - start) * ratio,
            y: canonical.y,
            w: canonical.w * ratio,
            h: canonical.h,
        };
        zones[zone].push(widget.placed_at(local));
    }

    let normalized: Vec<Vec<Widget>> = zones
        .iter()
        .map(|members| normalize(members, DISPLAY_ZONE_WIDTH))
        .collect();

    let order: Vec<usize> = match arrangement {
        ZoneArrangement::StackedReversed => (0..PRIMARY_SECTION_COUNT).rev().collect(),
        ZoneArrangement::SideBySide | ZoneArrangement::Stacked => {
            (0..PRIMARY_SECTION_COUNT).collect()
        }
    };

    let mut placed = Vec::new();
    let mut bands = Vec::new();
    let mut offset = 0.0;
    for zone in order {
        let members = &normalized[zone];
        if members.is_empty() {
            continue;
        }
        let (dx, dy) = match arrangement {
            ZoneArrangement::SideBySide => ((zone as u32 * DISPLAY_ZONE_WIDTH) as f64, 0.0),
            ZoneArrangement::Stacked | ZoneArrangement::StackedReversed => (0.0, offset),
        };
        let height = members
            .iter()
            .fold(0.0_f64, |max, member| max.max(member.position.bottom()));

        for member in members {
            let shown = member
                .position
                .with_origin(member.position.x + dx, member.position.y + dy);
            let source = ordered
                .iter()
                .find(|widget| widget.id == member.id)
                .map(|widget| widget.position)
                .unwrap_or(member.position);
            placed.push(DisplayWidget {
                widget: member.placed_at(shown),
                source,
            });
        }

        if arrangement != ZoneArrangement::SideBySide {
            bands.push(ZoneBand {
                zone,
                top: offset,
                bottom: offset + height,
            });
            offset += height + ZONE_STACK_GAP;
        }
    }

    (placed, bands)
}
