use chrono::{DateTime, Local};
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKind {
    Greeting,
    Help,
    Time,
    Date,
    Wellbeing,
    Weather,
    Joke,
    Thanks,
    Farewell,
    Acknowledgement,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub kind: ReplyKind,
    pub text: String,
}

// First match wins, so the order here is the priority order.
const RULES: &[(&[&str], ReplyKind)] = &[
    (&["hello", "hi"], ReplyKind::Greeting),
    (&["help"], ReplyKind::Help),
    (&["time"], ReplyKind::Time),
    (&["date"], ReplyKind::Date),
    (&["how are you"], ReplyKind::Wellbeing),
    (&["weather"], ReplyKind::Weather),
    (&["joke"], ReplyKind::Joke),
    (&["thank"], ReplyKind::Thanks),
    (&["bye"], ReplyKind::Farewell),
];

pub const JOKES: [&str; 4] = [
    "Why don't scientists trust atoms? Because they make up everything!",
    "What do you call a bear with no teeth? A gummy bear!",
    "Why did the scarecrow win an award? He was outstanding in his field!",
    "What do you call a fake noodle? An impasta!",
];

pub fn classify(text: &str) -> ReplyKind {
    let lowered = text.to_lowercase();
    let has_any = |phrases: &[&str]| phrases.iter().any(|phrase| lowered.contains(phrase));

    RULES
        .iter()
        .find(|(phrases, _)| has_any(phrases))
        .map(|(_, kind)| *kind)
        .unwrap_or(ReplyKind::Acknowledgement)
}

/// Picks the canned reply for `text`. Never fails: unmatched input falls
/// through to a generic acknowledgement that quotes the input.
pub fn compose_reply<R: Rng + ?Sized>(text: &str, now: DateTime<Local>, rng: &mut R) -> Reply {
    let kind = classify(text);
    let text = match kind {
        ReplyKind::Greeting => "Hello! 👋 Nice to meet you! How can I assist you today?".to_string(),
        ReplyKind::Help => "I can help you with:\n• Answering questions\n• Providing information\n• Having conversations\n• And much more! What do you need?".to_string(),
        ReplyKind::Time => format!("The current time is {}", now.format("%-I:%M:%S %p")),
        ReplyKind::Date => format!("Today is {}", now.format("%A, %B %-d, %Y")),
        ReplyKind::Wellbeing => "I'm doing great! Thanks for asking. 😊 How about you?".to_string(),
        ReplyKind::Weather => "I don't have real-time weather data, but I recommend checking a weather app or website for accurate information!".to_string(),
        ReplyKind::Joke => JOKES[rng.gen_range(0..JOKES.len())].to_string(),
        ReplyKind::Thanks => "You're welcome! 😊 Is there anything else I can help you with?".to_string(),
        ReplyKind::Farewell => "Goodbye! Feel free to message me anytime. Have a great day! 👋".to_string(),
        ReplyKind::Acknowledgement => {
            let templates = acknowledgements(text);
            let index = rng.gen_range(0..templates.len());
            templates[index].clone()
        }
    };

    Reply { kind, text }
}

pub fn acknowledgements(text: &str) -> [String; 4] {
    [
        format!("I understand you said: \"{text}\". How can I help you with that?"),
        format!("That's interesting! Tell me more about \"{text}\"."),
        format!("Got it! Regarding \"{text}\", I'm here to help. What would you like to know?"),
        format!("Thanks for sharing that! I'm processing your message about \"{text}\". What specific help do you need?"),
    ]
}
