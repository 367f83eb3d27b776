//! Bird speech-bubble chatter: trivia lines and card lore quizzes

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::catalog::AppState;
use crate::escape_html;

/// One speech bubble
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatterLine {
    /// Bubble markup
    pub html: String,
    /// Card name revealed when a quiz bubble is clicked
    pub answer: Option<String>,
}

impl ChatterLine {
    /// Markup shown after the quiz answer is revealed
    pub fn answer_html(&self) -> Option<String> {
        self.answer.as_ref().map(|name| {
            format!(
                "正解は「<strong>{}</strong>」でした！<small>（クリックで閉じる）</small>",
                escape_html(name)
            )
        })
    }
}

/// What a click on the speech bubble does
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BubbleClick {
    /// Show the quiz answer; hide it when the token's timer expires
    Reveal { html: String, token: u32 },
    Hide,
}

/// Speech-bubble state shared by the bubble's click listener and its timers
///
/// Each displayed text gets a token; a hide timer only hides the text it was
/// started for.
#[derive(Debug, Clone, Default)]
pub struct Bubble {
    answer: Option<String>,
    token: u32,
}

impl Bubble {
    /// A new line is on screen; returns its token
    pub fn show(&mut self, line: &ChatterLine) -> u32 {
        self.answer = line.answer_html();
        self.bump()
    }

    pub fn click(&mut self) -> BubbleClick {
        match self.answer.take() {
            Some(html) => BubbleClick::Reveal {
                html,
                token: self.bump(),
            },
            None => BubbleClick::Hide,
        }
    }

    /// Timer for `token` fired; true if the bubble should hide now
    pub fn expire(&mut self, token: u32) -> bool {
        if token != self.token {
            return false;
        }
        self.answer = None;
        true
    }

    fn bump(&mut self) -> u32 {
        self.token = self.token.wrapping_add(1);
        self.token
    }
}

/// Seeded chatter picker
#[derive(Debug, Clone)]
pub struct Chatter {
    rng: Pcg32,
}

impl Chatter {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Pick a line: trivia half the time when available, otherwise a lore quiz
    pub fn pick(&mut self, app: &AppState) -> Option<ChatterLine> {
        if app.trivia.is_empty() && app.cards.is_empty() {
            return None;
        }
        if !app.trivia.is_empty() && self.rng.random_bool(0.5) {
            return self.trivia(app);
        }
        self.lore_quiz(app).or_else(|| self.trivia(app))
    }

    fn trivia(&mut self, app: &AppState) -> Option<ChatterLine> {
        if app.trivia.is_empty() {
            return None;
        }
        let line = &app.trivia[self.rng.random_range(0..app.trivia.len())];
        Some(ChatterLine {
            html: line.clone(),
            answer: None,
        })
    }

    pub fn lore_quiz(&mut self, app: &AppState) -> Option<ChatterLine> {
        let candidates: Vec<_> = app.quiz_cards().collect();
        if candidates.is_empty() {
            return None;
        }
        let card = candidates[self.rng.random_range(0..candidates.len())];
        let lore = card.lore()?;
        Some(ChatterLine {
            html: format!(
                "「{}」<br>このカードはな～んだ？<small>（クリックで答えを見る）</small>",
                escape_html(&lore)
            ),
            answer: Some(card.name.clone()),
        })
    }
}
