//! Experiment paradigms and the output modalities each one drives.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The experiment being run. Fixed for the lifetime of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize, ValueEnum)]
pub enum Paradigm {
    /// Motor imagery: the cubes rise with the decoder output
    #[default]
    #[value(name = "mi")]
    MotorImagery,
    /// Covert visuospatial attention: cube sharpness and stereo volume follow
    /// the decoder output
    #[value(name = "cvsa")]
    Cvsa,
    /// Both of the above at once
    #[value(name = "hybrid")]
    Hybrid,
}

/// One way of showing the decoder output to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modality {
    /// Vertical position of the cubes
    Position,
    /// Shading sharpness of the cube materials
    Material,
    /// Volume of the left and right audio channels
    Audio,
}

impl Paradigm {
    /// Every paradigm, in menu order.
    pub const ALL: [Paradigm; 3] = [Paradigm::MotorImagery, Paradigm::Cvsa, Paradigm::Hybrid];

    /// The modalities this paradigm drives during feedback, and resets at
    /// the end of each trial.
    pub fn modalities(self) -> &'static [Modality] {
        match self {
            Paradigm::MotorImagery => &[Modality::Position],
            Paradigm::Cvsa => &[Modality::Material, Modality::Audio],
            Paradigm::Hybrid => &[Modality::Position, Modality::Material, Modality::Audio],
        }
    }

    /// Whether `modality` is driven by this paradigm.
    pub fn drives(self, modality: Modality) -> bool {
        self.modalities().contains(&modality)
    }

    /// Name of the scene that hosts this paradigm.
    pub fn scene_name(self) -> &'static str {
        match self {
            Paradigm::MotorImagery => "BCI_MI",
            Paradigm::Cvsa => "BCI_CVSA",
            Paradigm::Hybrid => "BCI_HYBRID",
        }
    }
}

impl fmt::Display for Paradigm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Paradigm::MotorImagery => "Motor imagery",
            Paradigm::Cvsa => "Covert visuospatial attention",
            Paradigm::Hybrid => "Hybrid",
        };
        write!(f, "{}", name)
    }
}
