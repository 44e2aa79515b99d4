//! Entity storage and the deterministic random source backing the field.

use meteor_defence_core::{PackedCell, FIELD_HEIGHT, FIELD_WIDTH, MAX_ASTEROIDS, MAX_PROJECTILES};

const RNG_MULTIPLIER: u64 = 6_364_136_223_846_793_005;
const RNG_INCREMENT: u64 = 1;

/// Rows kept clear of asteroids when a fresh field is populated.
pub(crate) const SPAWN_FLOOR_ROW: u8 = 3;

/// Unordered, gap-free asteroid storage.
///
/// Removal swaps the last entry into the hole, so indices and relative order
/// are unstable across removals. Callers must never rely on entry order.
#[derive(Clone, Debug, Default)]
pub(crate) struct AsteroidBelt {
    cells: Vec<PackedCell>,
}

impl AsteroidBelt {
    pub(crate) fn new() -> Self {
        Self {
            cells: Vec::with_capacity(MAX_ASTEROIDS),
        }
    }

    /// Index of the first asteroid at the given cell, scanning in array order.
    pub(crate) fn find_at(&self, x: u8, y: u8) -> Option<usize> {
        let probe = PackedCell::pack(x, y);
        self.cells.iter().position(|cell| *cell == probe)
    }

    /// Removes the entry at `index` by swapping in the last entry.
    ///
    /// An out-of-range index is a safe no-op returning `None`, enabling the
    /// find-then-remove idiom without a guard at every call site.
    pub(crate) fn remove_at(&mut self, index: usize) -> Option<PackedCell> {
        if index >= self.cells.len() {
            return None;
        }
        Some(self.cells.swap_remove(index))
    }

    /// Appends an asteroid, silently dropping it when the belt is full.
    pub(crate) fn push(&mut self, cell: PackedCell) {
        if self.cells.len() < MAX_ASTEROIDS {
            self.cells.push(cell);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.cells.len()
    }

    pub(crate) fn cells(&self) -> &[PackedCell] {
        &self.cells
    }

    pub(crate) fn clear(&mut self) {
        self.cells.clear();
    }
}

/// Order-preserving projectile storage.
///
/// Removal shifts every later entry down one slot, so relative order among
/// survivors is stable, unlike [`AsteroidBelt`].
#[derive(Clone, Debug, Default)]
pub(crate) struct ProjectileRack {
    cells: Vec<PackedCell>,
}

impl ProjectileRack {
    pub(crate) fn new() -> Self {
        Self {
            cells: Vec::with_capacity(MAX_PROJECTILES),
        }
    }

    /// Index of the first projectile at the given cell, scanning in array order.
    pub(crate) fn find_at(&self, x: u8, y: u8) -> Option<usize> {
        let probe = PackedCell::pack(x, y);
        self.cells.iter().position(|cell| *cell == probe)
    }

    /// Removes the entry at `index`, shifting later entries down.
    ///
    /// An out-of-range index is a safe no-op returning `None`.
    pub(crate) fn remove_at(&mut self, index: usize) -> Option<PackedCell> {
        if index >= self.cells.len() {
            return None;
        }
        Some(self.cells.remove(index))
    }

    /// Appends a projectile, silently dropping it when the rack is full.
    pub(crate) fn push(&mut self, cell: PackedCell) {
        if self.cells.len() < MAX_PROJECTILES {
            self.cells.push(cell);
        }
    }

    pub(crate) fn get(&self, index: usize) -> Option<PackedCell> {
        self.cells.get(index).copied()
    }

    pub(crate) fn set(&mut self, index: usize, cell: PackedCell) {
        if let Some(slot) = self.cells.get_mut(index) {
            *slot = cell;
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.cells.len()
    }

    pub(crate) fn cells(&self) -> &[PackedCell] {
        &self.cells
    }

    pub(crate) fn clear(&mut self) {
        self.cells.clear();
    }
}

/// Seedable linear-congruential random source for spawn columns and rows.
#[derive(Clone, Debug)]
pub(crate) struct FieldRng {
    state: u64,
}

impl FieldRng {
    pub(crate) const fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn advance(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(RNG_MULTIPLIER)
            .wrapping_add(RNG_INCREMENT);
        self.state
    }

    /// Uniform column in `0..FIELD_WIDTH`.
    pub(crate) fn column(&mut self) -> u8 {
        (self.advance() % u64::from(FIELD_WIDTH)) as u8
    }

    /// Uniform row in `SPAWN_FLOOR_ROW..FIELD_HEIGHT`.
    pub(crate) fn spawn_row(&mut self) -> u8 {
        SPAWN_FLOOR_ROW + (self.advance() % u64::from(FIELD_HEIGHT - SPAWN_FLOOR_ROW)) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::{AsteroidBelt, FieldRng, ProjectileRack};
    use meteor_defence_core::{PackedCell, FIELD_HEIGHT, FIELD_WIDTH, MAX_ASTEROIDS};

    #[test]
    fn belt_removal_swaps_last_entry_in() {
        let mut belt = AsteroidBelt::new();
        belt.push(PackedCell::pack(1, 5));
        belt.push(PackedCell::pack(2, 6));
        belt.push(PackedCell::pack(3, 7));

        assert_eq!(belt.remove_at(0), Some(PackedCell::pack(1, 5)));
        assert_eq!(belt.len(), 2);
        assert!(belt.find_at(2, 6).is_some());
        assert!(belt.find_at(3, 7).is_some());
        assert!(belt.find_at(1, 5).is_none());
    }

    #[test]
    fn belt_out_of_range_removal_is_a_no_op() {
        let mut belt = AsteroidBelt::new();
        belt.push(PackedCell::pack(4, 4));
        let before = belt.cells().to_vec();

        assert_eq!(belt.remove_at(7), None);
        assert_eq!(belt.cells(), before.as_slice());
    }

    #[test]
    fn belt_drops_entries_beyond_capacity() {
        let mut belt = AsteroidBelt::new();
        for i in 0..(MAX_ASTEROIDS + 3) {
            belt.push(PackedCell::pack((i % 8) as u8, (i % 16) as u8));
        }
        assert_eq!(belt.len(), MAX_ASTEROIDS);
    }

    #[test]
    fn rack_removal_preserves_order() {
        let mut rack = ProjectileRack::new();
        rack.push(PackedCell::pack(0, 2));
        rack.push(PackedCell::pack(1, 2));
        rack.push(PackedCell::pack(2, 2));

        assert_eq!(rack.remove_at(1), Some(PackedCell::pack(1, 2)));
        assert_eq!(
            rack.cells(),
            &[PackedCell::pack(0, 2), PackedCell::pack(2, 2)]
        );
    }

    #[test]
    fn rack_out_of_range_removal_is_a_no_op() {
        let mut rack = ProjectileRack::new();
        rack.push(PackedCell::pack(3, 2));
        let before = rack.cells().to_vec();

        assert_eq!(rack.remove_at(1), None);
        assert_eq!(rack.cells(), before.as_slice());
    }

    #[test]
    fn rng_respects_domains() {
        let mut rng = FieldRng::new(0x5eed);
        for _ in 0..256 {
            assert!(rng.column() < FIELD_WIDTH);
            let row = rng.spawn_row();
            assert!((3..FIELD_HEIGHT).contains(&row));
        }
    }

    #[test]
    fn rng_is_deterministic_for_equal_seeds() {
        let mut first = FieldRng::new(99);
        let mut second = FieldRng::new(99);
        for _ in 0..64 {
            assert_eq!(first.column(), second.column());
        }
    }
}
