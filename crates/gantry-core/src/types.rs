use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// MachineId
// ---------------------------------------------------------------------------

/// Identifier for a registered machine.
///
/// Allocated by the machine registry, monotonically increasing. `Ord` so
/// that map iteration over machines is deterministic from tick to tick.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct MachineId(pub u64);

impl MachineId {
    /// Raw numeric id.
    #[must_use]
    pub const fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for MachineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "machine#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn machine_id_ordering_follows_allocation() {
        let a = MachineId(1);
        let b = MachineId(2);
        assert!(a < b);
        assert_eq!(a, MachineId(1));
    }

    #[test]
    fn machine_id_display() {
        assert_eq!(MachineId(7).to_string(), "machine#7");
    }

    #[test]
    fn machine_id_usable_as_map_key() {
        let mut map = std::collections::BTreeMap::new();
        map.insert(MachineId(3), "lathe");
        map.insert(MachineId(1), "mill");
        let keys: Vec<_> = map.keys().copied().collect();
        assert_eq!(keys, vec![MachineId(1), MachineId(3)]);
    }
}
