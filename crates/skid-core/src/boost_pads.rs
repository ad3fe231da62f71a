use crate::{BoostPadState, FieldInfo, Vector3, WorldSnapshot};

/// A boost pad with its current availability.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoostPad {
    pub location: Vector3,
    pub is_full_boost: bool,
    pub is_active: bool,
    /// Seconds until the pad is active again
    pub timer: f64,
}

/// Keeps the static pad layout together with the per-tick active flags.
#[derive(Clone, Debug, Default)]
pub struct BoostPadTable {
    pads: Vec<BoostPad>,
}

impl BoostPadTable {
    /// Build the table from the field layout. All pads start out active.
    pub fn new(field: &FieldInfo) -> Self {
        Self {
            pads: field
                .boost_pads
                .iter()
                .map(|info| BoostPad {
                    location: info.location,
                    is_full_boost: info.is_full_boost,
                    is_active: true,
                    timer: 0.0,
                })
                .collect(),
        }
    }

    /// Refresh the active flags from a snapshot.
    pub fn update_status(&mut self, snapshot: &WorldSnapshot) {
        self.update_from_states(&snapshot.boost_pad_states);
    }

    pub fn update_from_states(&mut self, states: &[BoostPadState]) {
        if !states.is_empty() && states.len() != self.pads.len() {
            log::warn!(
                "Boost pad state count ({}) does not match the layout ({})",
                states.len(),
                self.pads.len()
            );
        }
        for (pad, state) in self.pads.iter_mut().zip(states) {
            pad.is_active = state.is_active;
            pad.timer = state.timer;
        }
    }

    pub fn pads(&self) -> &[BoostPad] {
        &self.pads
    }

    pub fn full_boosts(&self) -> impl Iterator<Item = &BoostPad> {
        self.pads.iter().filter(|pad| pad.is_full_boost)
    }
}
