use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Species {
    Tyrannosaurus,
    Velociraptor,
    Spinosaurus,
    Megalosaurus,
    Brachiosaurus,
    Stegosaurus,
    Ankylosaurus,
    Triceratops,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Diet {
    Herbivore,
    Carnivore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PowerStatus {
    Active,
    Down,
}

pub const SPECIES_DIETS: [(Species, Diet); 8] = [
    (Species::Tyrannosaurus, Diet::Carnivore),
    (Species::Velociraptor, Diet::Carnivore),
    (Species::Spinosaurus, Diet::Carnivore),
    (Species::Megalosaurus, Diet::Carnivore),
    (Species::Brachiosaurus, Diet::Herbivore),
    (Species::Stegosaurus, Diet::Herbivore),
    (Species::Ankylosaurus, Diet::Herbivore),
    (Species::Triceratops, Diet::Herbivore),
];

impl Species {
    pub fn parse(name: &str) -> Option<Self> {
        SPECIES_DIETS
            .iter()
            .map(|(species, _)| *species)
            .find(|species| species.name() == name)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Species::Tyrannosaurus => "Tyrannosaurus",
            Species::Velociraptor => "Velociraptor",
            Species::Spinosaurus => "Spinosaurus",
            Species::Megalosaurus => "Megalosaurus",
            Species::Brachiosaurus => "Brachiosaurus",
            Species::Stegosaurus => "Stegosaurus",
            Species::Ankylosaurus => "Ankylosaurus",
            Species::Triceratops => "Triceratops",
        }
    }

    pub fn diet(&self) -> Diet {
        diet_of(*self)
    }
}

pub fn diet_of(species: Species) -> Diet {
    let (_, diet) = SPECIES_DIETS[species as usize];
    diet
}

pub fn classify(name: &str) -> Option<(Species, Diet)> {
    Species::parse(name).map(|species| (species, diet_of(species)))
}
