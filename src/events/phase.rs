use bitflags::bitflags;

/// The three passes every phased context goes through, in this order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Phase {
    Construction,
    Filling,
    Finalizing,
}

impl Phase {
    pub const ALL: [Phase; 3] = [Phase::Construction, Phase::Filling, Phase::Finalizing];

    pub fn mask(self) -> PhaseMask {
        match self {
            Phase::Construction => PhaseMask::CONSTRUCTION,
            Phase::Filling => PhaseMask::FILLING,
            Phase::Finalizing => PhaseMask::FINALIZING,
        }
    }
}

bitflags! {
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct PhaseMask: u8 {
        const CONSTRUCTION = 0b001;
        const FILLING = 0b010;
        const FINALIZING = 0b100;
    }
}

impl PhaseMask {
    pub fn matches(self, phase: Phase) -> bool {
        self.contains(phase.mask())
    }
}
