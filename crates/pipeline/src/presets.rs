use crate::error::{PipelineError, Result};

pub const FRUITS: &[&str] = &[
    "Apple",
    "Banana",
    "Pear",
    "Peach",
    "Apricot",
    "Cherry",
    "Pineapple",
    "Kiwifruit",
    "Mango",
    "Fig",
    "Watermelon",
    "Papaya",
    "Dragonfruit",
    "Orange (fruit)",
    "Plum",
    "Passionfruit",
    "Rambutan",
    "Lychee",
    "Lemon",
    "Blueberry",
    "Raspberry",
    "Grapefruit",
    "Lime",
    "Strawberry",
    "Mandarin orange",
];

pub const SCIENTISTS: &[&str] = &[
    "Albert Einstein",
    "Galileo Galilei",
    "Christiaan Huygens",
    "Isaac Newton",
    "Leonhard Euler",
    "Pierre-Simon Laplace",
    "Joseph Fourier",
    "James Clerk Maxwell",
    "Nikola Tesla",
    "Max Planck",
    "Emmy Noether",
    "Max Born",
    "Niels Bohr",
    "Erwin Schrödinger",
    "Louis de Broglie",
    "Satyendra Nath Bose",
    "Enrico Fermi",
    "Abdus Salam",
    "Charles Darwin",
    "Elizabeth Blackburn",
    "Lorna Casselton",
    "Rachel Carson",
    "Rosalind Franklin",
    "Jane Goodall",
    "Dorothy Hodgkin",
    "Shirley Ann Jackson",
    "Cynthia Kenyon",
    "Ada Lovelace",
];

pub fn preset(name: &str) -> Result<&'static [&'static str]> {
    match name.trim().to_ascii_lowercase().as_str() {
        "fruits" => Ok(FRUITS),
        "scientists" => Ok(SCIENTISTS),
        other => Err(PipelineError::UnknownPreset(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_resolve_by_name() {
        assert_eq!(preset("fruits").unwrap().len(), 25);
        assert_eq!(preset("Scientists").unwrap()[0], "Albert Einstein");
        assert!(matches!(
            preset("vegetables"),
            Err(PipelineError::UnknownPreset(name)) if name == "vegetables"
        ));
    }
}
