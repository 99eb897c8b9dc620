// src/services/dice.rs
use rand::Rng;

pub const SIDES: u8 = 6;

pub fn roll() -> u8 {
    rand::rng().random_range(1..=SIDES)
}

pub fn roll_message(value: u8) -> String {
    format!("🎲 You rolled a {value}!")
}
