//! Tarot deck and spread catalog.
//!
//! The built-in deck is the 22 Major Arcana. Spreads are named templates of
//! ordered positions that a reading is drawn against.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// A card in the built-in deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: u32,
    pub name: &'static str,
    pub meaning: &'static str,
    pub reversed_meaning: &'static str,
    pub image: &'static str,
}

impl Card {
    /// Meaning text for the given orientation.
    #[inline]
    pub fn meaning_for(&self, reversed: bool) -> &'static str {
        if reversed {
            self.reversed_meaning
        } else {
            self.meaning
        }
    }
}

/// A card as drawn for a reading.
///
/// This is the descriptor clients submit and the exact list persisted with
/// each interpretation. Meaning fields may be left empty by clients; they are
/// resolved against the built-in deck when the prompt is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawnCard {
    pub id: u32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_en: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub meaning: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reversed_meaning: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub is_reversed: bool,
}

impl DrawnCard {
    /// Build a drawn card from a deck card.
    pub fn from_card(card: &Card, reversed: bool) -> Self {
        Self {
            id: card.id,
            name: card.name.to_string(),
            name_en: None,
            meaning: card.meaning.to_string(),
            reversed_meaning: card.reversed_meaning.to_string(),
            image: Some(card.image.to_string()),
            is_reversed: reversed,
        }
    }

    /// The meaning text matching this card's orientation.
    ///
    /// Falls back to the built-in deck when the submitted text is empty.
    pub fn orientation_meaning(&self) -> &str {
        let submitted = if self.is_reversed {
            self.reversed_meaning.as_str()
        } else {
            self.meaning.as_str()
        };
        if !submitted.is_empty() {
            return submitted;
        }
        find_card(self.id)
            .map(|c| c.meaning_for(self.is_reversed))
            .unwrap_or("")
    }

    /// Human-readable orientation label.
    #[inline]
    pub fn orientation(&self) -> &'static str {
        if self.is_reversed { "reversed" } else { "upright" }
    }
}

/// A position within a spread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpreadPosition {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// A spread: a named, ordered template of positions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spread {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub positions: Vec<SpreadPosition>,
}

impl Spread {
    /// Fill in name, description and positions from the built-in catalog
    /// when the client sent only the id.
    pub fn resolve(mut self) -> Option<Self> {
        if !self.positions.is_empty() {
            return Some(self);
        }
        let builtin = find_spread(&self.id)?;
        if self.name.is_empty() {
            self.name = builtin.name;
        }
        if self.description.is_empty() {
            self.description = builtin.description;
        }
        self.positions = builtin.positions;
        Some(self)
    }
}

macro_rules! card {
    ($id:expr, $name:expr, $image:expr, $meaning:expr, $reversed:expr) => {
        Card {
            id: $id,
            name: $name,
            meaning: $meaning,
            reversed_meaning: $reversed,
            image: $image,
        }
    };
}

/// The 22 Major Arcana.
pub const MAJOR_ARCANA: [Card; 22] = [
    card!(0, "The Fool", "/tarot/00-fool.jpg",
        "New beginnings, adventure, innocence, spontaneity, a free spirit",
        "Recklessness, risk-taking, foolishness, irresponsibility"),
    card!(1, "The Magician", "/tarot/01-magician.jpg",
        "Creativity, willpower, skill, focus, action",
        "Deception, weak will, misuse of talent"),
    card!(2, "The High Priestess", "/tarot/02-high-priestess.jpg",
        "Intuition, mystery, the subconscious, wisdom, inner knowledge",
        "Repressed feelings, lack of inner guidance, secrets revealed"),
    card!(3, "The Empress", "/tarot/03-empress.jpg",
        "Abundance, creativity, nature, nurturing, beauty",
        "Blocked creativity, dependence on others, emptiness"),
    card!(4, "The Emperor", "/tarot/04-emperor.jpg",
        "Authority, structure, control, leadership, stability",
        "Excessive control, lack of discipline, weakness"),
    card!(5, "The Hierophant", "/tarot/05-hierophant.jpg",
        "Tradition, spiritual guidance, belief, learning, conformity",
        "Rebellion, new approaches, restricted freedom, false beliefs"),
    card!(6, "The Lovers", "/tarot/06-lovers.jpg",
        "Love, harmony, relationships, choices of values, union",
        "Disharmony, imbalance, misaligned values, hard choices"),
    card!(7, "The Chariot", "/tarot/07-chariot.jpg",
        "Willpower, victory, determination, self-control, progress",
        "Loss of direction, lack of control, aggression, obstacles"),
    card!(8, "Strength", "/tarot/08-strength.jpg",
        "Courage, inner strength, patience, compassion, gentle control",
        "Self-doubt, weakness, insecurity, lack of self-discipline"),
    card!(9, "The Hermit", "/tarot/09-hermit.jpg",
        "Introspection, solitude, inner guidance, seeking truth",
        "Isolation, loneliness, withdrawal, refusing help"),
    card!(10, "Wheel of Fortune", "/tarot/10-wheel-of-fortune.jpg",
        "Cycles, destiny, turning points, luck, change",
        "Bad luck, resisting change, breaking cycles"),
    card!(11, "Justice", "/tarot/11-justice.jpg",
        "Fairness, truth, law, cause and effect, balance",
        "Injustice, dishonesty, avoiding accountability"),
    card!(12, "The Hanged Man", "/tarot/12-hanged-man.jpg",
        "Surrender, new perspectives, pause, letting go",
        "Stalling, resistance, needless sacrifice, indecision"),
    card!(13, "Death", "/tarot/13-death.jpg",
        "Endings, transformation, transition, letting go of the old",
        "Resisting change, stagnation, fear of endings"),
    card!(14, "Temperance", "/tarot/14-temperance.jpg",
        "Balance, moderation, patience, purpose, harmony",
        "Imbalance, excess, lack of long-term vision"),
    card!(15, "The Devil", "/tarot/15-devil.jpg",
        "Bondage, temptation, materialism, attachment, shadow self",
        "Release, breaking free, reclaiming power"),
    card!(16, "The Tower", "/tarot/16-tower.jpg",
        "Sudden upheaval, revelation, disruption, awakening",
        "Averted disaster, fear of change, delaying the inevitable"),
    card!(17, "The Star", "/tarot/17-star.jpg",
        "Hope, faith, renewal, inspiration, serenity",
        "Despair, lack of faith, discouragement, disconnection"),
    card!(18, "The Moon", "/tarot/18-moon.jpg",
        "Illusion, intuition, the unconscious, uncertainty, dreams",
        "Clarity returning, released fear, repressed emotions surfacing"),
    card!(19, "The Sun", "/tarot/19-sun.jpg",
        "Joy, success, vitality, positivity, warmth",
        "Temporary gloom, excessive optimism, delayed success"),
    card!(20, "Judgement", "/tarot/20-judgement.jpg",
        "Rebirth, inner calling, reckoning, absolution",
        "Self-doubt, harsh self-judgement, ignoring the call"),
    card!(21, "The World", "/tarot/21-world.jpg",
        "Completion, integration, accomplishment, travel, fulfilment",
        "Incompletion, lack of closure, delays"),
];

/// Look up a deck card by id.
#[inline]
pub fn find_card(id: u32) -> Option<&'static Card> {
    MAJOR_ARCANA.iter().find(|c| c.id == id)
}

fn position(id: &str, name: &str, description: &str) -> SpreadPosition {
    SpreadPosition {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
    }
}

/// The built-in spreads.
pub fn builtin_spreads() -> Vec<Spread> {
    vec![
        Spread {
            id: "single".into(),
            name: "Single Card".into(),
            description: "A quick reading for a single question".into(),
            positions: vec![position("position1", "Present", "A symbol of the current situation")],
        },
        Spread {
            id: "three".into(),
            name: "Three Card Spread".into(),
            description: "Past, present and future: how the situation unfolds".into(),
            positions: vec![
                position("position1", "Past", "What shaped the situation"),
                position("position2", "Present", "The current state of affairs"),
                position("position3", "Future", "The likely outcome"),
            ],
        },
        Spread {
            id: "cross".into(),
            name: "Celtic Cross".into(),
            description: "A comprehensive analysis of the question".into(),
            positions: vec![
                position("position1", "Present", "The heart of the situation"),
                position("position2", "Challenge", "The obstacle or challenge faced"),
                position("position3", "Past", "Influences from the past"),
                position("position4", "Future", "What the near future may bring"),
                position("position5", "Above", "The subconscious or higher guidance"),
                position("position6", "Below", "The conscious mind or foundation"),
                position("position7", "Advice", "How to approach the situation"),
                position("position8", "External Influences", "Environment and other people"),
                position("position9", "Hopes and Fears", "Deepest wishes and worries"),
                position("position10", "Outcome", "The final likely result"),
            ],
        },
    ]
}

/// Look up a built-in spread by id.
pub fn find_spread(id: &str) -> Option<Spread> {
    builtin_spreads().into_iter().find(|s| s.id == id)
}

/// Draw `count` distinct cards with random orientation.
///
/// `count` is clamped to the deck size.
pub fn draw_cards(count: usize) -> Vec<DrawnCard> {
    let mut rng = rand::thread_rng();
    let count = count.min(MAJOR_ARCANA.len());
    MAJOR_ARCANA
        .choose_multiple(&mut rng, count)
        .map(|card| DrawnCard::from_card(card, rng.r#gen::<bool>()))
        .collect()
}
