//! Standins: fixed choice sets backed by stateless foreign marker classes.
//!
//! A standin foreign type cannot be converted from a host value; instead the
//! host picks one of a closed set of choices, and the bridge constructs the
//! mapped foreign class with its zero-arg constructor.

use crate::foreign::ForeignType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The foreign interface a family of standin choices implements.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StandinKind {
    /// Strategy for reading pixels outside an image's bounds.
    OutOfBoundsFactory,
    /// Pixel neighbourhood used by connected-component labeling.
    StructuringElement,
}

/// One selectable standin value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StandinChoice {
    /// Repeat the edge pixel.
    Border,
    /// Mirror with exponentially decaying weight.
    MirrorExpWindowing,
    /// Mirror without repeating the edge pixel.
    MirrorSingle,
    /// Mirror repeating the edge pixel.
    MirrorDouble,
    /// Wrap around.
    Periodic,
    /// Edge neighbours only.
    FourConnected,
    /// Edge and corner neighbours.
    EightConnected,
}

struct StandinRow {
    choice: StandinChoice,
    kind: StandinKind,
    label: &'static str,
    class: &'static str,
}

const STANDINS: &[StandinRow] = &[
    StandinRow {
        choice: StandinChoice::Border,
        kind: StandinKind::OutOfBoundsFactory,
        label: "Border",
        class: "net.imglib2.outofbounds.OutOfBoundsBorderFactory",
    },
    StandinRow {
        choice: StandinChoice::MirrorExpWindowing,
        kind: StandinKind::OutOfBoundsFactory,
        label: "Mirror (exponential windowing)",
        class: "net.imglib2.outofbounds.OutOfBoundsMirrorExpWindowingFactory",
    },
    StandinRow {
        choice: StandinChoice::MirrorSingle,
        kind: StandinKind::OutOfBoundsFactory,
        label: "Mirror (single boundary)",
        class: "net.imglib2.outofbounds.OutOfBoundsMirrorSingleBoundaryFactory",
    },
    StandinRow {
        choice: StandinChoice::MirrorDouble,
        kind: StandinKind::OutOfBoundsFactory,
        label: "Mirror (double boundary)",
        class: "net.imglib2.outofbounds.OutOfBoundsMirrorDoubleBoundaryFactory",
    },
    StandinRow {
        choice: StandinChoice::Periodic,
        kind: StandinKind::OutOfBoundsFactory,
        label: "Periodic",
        class: "net.imglib2.outofbounds.OutOfBoundsPeriodicFactory",
    },
    StandinRow {
        choice: StandinChoice::FourConnected,
        kind: StandinKind::StructuringElement,
        label: "Four-connected",
        class: "net.imglib2.algorithm.labeling.ConnectedComponents$FourConnected",
    },
    StandinRow {
        choice: StandinChoice::EightConnected,
        kind: StandinKind::StructuringElement,
        label: "Eight-connected",
        class: "net.imglib2.algorithm.labeling.ConnectedComponents$EightConnected",
    },
];

impl StandinKind {
    /// All standin kinds.
    pub const ALL: [StandinKind; 2] = [Self::OutOfBoundsFactory, Self::StructuringElement];

    /// The foreign interface parameters of this kind are declared with.
    pub fn foreign_type(self) -> ForeignType {
        ForeignType::new(match self {
            Self::OutOfBoundsFactory => "net.imglib2.outofbounds.OutOfBoundsFactory",
            Self::StructuringElement => {
                "net.imglib2.algorithm.labeling.ConnectedComponents$StructuringElement"
            }
        })
    }

    /// The standin kind declared by `ty`, if any.
    pub fn for_foreign_type(ty: &ForeignType) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.foreign_type() == *ty)
    }

    /// Choices of this kind, in table order.
    pub fn choices(self) -> Vec<StandinChoice> {
        STANDINS
            .iter()
            .filter(|row| row.kind == self)
            .map(|row| row.choice)
            .collect()
    }

    /// The choice of this kind carrying `label`.
    pub fn choice_for_label(self, label: &str) -> Option<StandinChoice> {
        STANDINS
            .iter()
            .find(|row| row.kind == self && row.label.eq_ignore_ascii_case(label))
            .map(|row| row.choice)
    }

    /// Short name used when rendering signatures.
    pub fn name(self) -> &'static str {
        match self {
            Self::OutOfBoundsFactory => "OutOfBoundsFactory",
            Self::StructuringElement => "StructuringElement",
        }
    }
}

impl fmt::Display for StandinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl StandinChoice {
    fn row(self) -> &'static StandinRow {
        // every variant has exactly one row
        STANDINS
            .iter()
            .find(|row| row.choice == self)
            .unwrap_or(&STANDINS[0])
    }

    /// The kind this choice belongs to.
    pub fn kind(self) -> StandinKind {
        self.row().kind
    }

    /// Display label.
    pub fn label(self) -> &'static str {
        self.row().label
    }

    /// The foreign class constructed for this choice.
    pub fn foreign_class(self) -> ForeignType {
        ForeignType::new(self.row().class)
    }

    /// The choice whose foreign class is `class`.
    pub fn from_foreign_class(class: &ForeignType) -> Option<Self> {
        STANDINS
            .iter()
            .find(|row| row.class == class.name())
            .map(|row| row.choice)
    }
}

impl fmt::Display for StandinChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
