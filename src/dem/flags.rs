/// Per-entity status bits. The flag set is closed: these are all the bits the
/// lifecycle code ever touches, so a fixed-width bitset is enough and no
/// runtime flag registry is needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Flags(u16);

impl Flags {
    /// Pending removal; consumed by the compaction passes.
    pub const TO_ERASE: Flags = Flags(1 << 0);
    /// Just injected, still waiting for its first contact-free step.
    pub const NEW_ENTITY: Flags = Flags(1 << 1);
    /// Fixed support particle (inlet layer node), exempt from release.
    pub const BLOCKED: Flags = Flags(1 << 2);
    /// Occupying an inlet placement node; prevents re-selection.
    pub const ACTIVE: Flags = Flags(1 << 3);

    pub const FIXED_VEL_X: Flags = Flags(1 << 4);
    pub const FIXED_VEL_Y: Flags = Flags(1 << 5);
    pub const FIXED_VEL_Z: Flags = Flags(1 << 6);
    pub const FIXED_ANG_VEL_X: Flags = Flags(1 << 7);
    pub const FIXED_ANG_VEL_Y: Flags = Flags(1 << 8);
    pub const FIXED_ANG_VEL_Z: Flags = Flags(1 << 9);

    pub const FIXED_VEL: [Flags; 3] = [Flags::FIXED_VEL_X, Flags::FIXED_VEL_Y, Flags::FIXED_VEL_Z];
    pub const FIXED_ANG_VEL: [Flags; 3] = [
        Flags::FIXED_ANG_VEL_X,
        Flags::FIXED_ANG_VEL_Y,
        Flags::FIXED_ANG_VEL_Z,
    ];

    pub fn empty() -> Flags {
        Flags(0)
    }

    pub fn is(self, flag: Flags) -> bool {
        self.0 & flag.0 != 0
    }

    pub fn is_not(self, flag: Flags) -> bool {
        !self.is(flag)
    }

    pub fn set(&mut self, flag: Flags) {
        self.0 |= flag.0;
    }

    pub fn reset(&mut self, flag: Flags) {
        self.0 &= !flag.0;
    }
}

#[cfg(test)]
mod tests {
    use super::Flags;

    #[test]
    fn set_reset_roundtrip() {
        let mut f = Flags::empty();
        assert!(f.is_not(Flags::TO_ERASE));

        f.set(Flags::TO_ERASE);
        f.set(Flags::BLOCKED);
        assert!(f.is(Flags::TO_ERASE));
        assert!(f.is(Flags::BLOCKED));
        assert!(f.is_not(Flags::ACTIVE));

        f.reset(Flags::TO_ERASE);
        assert!(f.is_not(Flags::TO_ERASE));
        assert!(f.is(Flags::BLOCKED));
    }

    #[test]
    fn axis_flag_arrays_are_distinct() {
        let mut f = Flags::empty();
        for d in 0..3 {
            f.set(Flags::FIXED_VEL[d]);
            f.set(Flags::FIXED_ANG_VEL[d]);
        }
        for d in 0..3 {
            f.reset(Flags::FIXED_VEL[d]);
            assert!(f.is_not(Flags::FIXED_VEL[d]));
            assert!(f.is(Flags::FIXED_ANG_VEL[d]));
        }
    }
}
