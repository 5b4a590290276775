//! Slot classification against the operator cutoff

use chrono::NaiveDateTime;

use crate::models::AvailableSlot;

/// Slots of one availability response, split by eligibility
///
/// The three groups are disjoint and together hold every input slot, each
/// group keeping the input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotClassification {
    /// Slots the API marks as not active
    pub inactive: Vec<AvailableSlot>,
    /// Active slots starting at or after the cutoff
    pub ineligible: Vec<AvailableSlot>,
    /// Active slots starting strictly before the cutoff
    pub eligible: Vec<AvailableSlot>,
}

impl SlotClassification {
    /// Start times of the eligible slots, in input order
    pub fn eligible_start_times(&self) -> Vec<NaiveDateTime> {
        self.eligible.iter().map(|s| s.start_timestamp).collect()
    }

    /// Whether anything is worth publishing
    pub fn has_eligible(&self) -> bool {
        !self.eligible.is_empty()
    }

    /// Number of classified slots
    pub fn total(&self) -> usize {
        self.inactive.len() + self.ineligible.len() + self.eligible.len()
    }
}

/// Partition `slots` into inactive, ineligible and eligible
///
/// A slot is eligible iff it is active and starts strictly before `cutoff`;
/// a slot starting exactly at `cutoff` is ineligible.
pub fn classify(slots: Vec<AvailableSlot>, cutoff: NaiveDateTime) -> SlotClassification {
    let mut classification = SlotClassification::default();

    for slot in slots {
        if !slot.active {
            classification.inactive.push(slot);
        } else if slot.start_timestamp < cutoff {
            classification.eligible.push(slot);
        } else {
            classification.ineligible.push(slot);
        }
    }

    classification
}
