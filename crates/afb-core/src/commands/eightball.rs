use async_trait::async_trait;
use chrono::Utc;
use rand::seq::SliceRandom;

use crate::{
    formatting::code_block,
    messaging::types::{Embed, Reply, COLOR_GREEN, COLOR_RED, COLOR_YELLOW},
    Result,
};

use super::{CommandContext, CommandHandler, CommandSpec, Invocation, ParamKind, ParamSpec};

pub const RESPONSES: [&str; 19] = [
    "As I see it, yes",
    "Yes",
    "No",
    "Very likely",
    "Not even close",
    "Maybe",
    "Very unlikely",
    "Gino's mom told me yes",
    "Gino's mom told me no",
    "Ask again later",
    "Better not tell you now",
    "Concentrate and ask again",
    "Don't count on it",
    "It is certain",
    "My sources say no",
    "Outlook good",
    "You may rely on it",
    "Very Doubtful",
    "Without a doubt",
];

// Plain substring matches; negative words win over positive ones.
const NEGATIVE: [&str; 4] = ["no", "not", "doubtful", "unlikely"];
const POSITIVE: [&str; 6] = ["yes", "certain", "good", "rely", "doubt", "likely"];

pub fn answer_color(answer: &str) -> u32 {
    let lower = answer.to_lowercase();
    if NEGATIVE.iter().any(|w| lower.contains(w)) {
        COLOR_RED
    } else if POSITIVE.iter().any(|w| lower.contains(w)) {
        COLOR_GREEN
    } else {
        COLOR_YELLOW
    }
}

pub fn answer_emoji(answer: &str) -> &'static str {
    let lower = answer.to_lowercase();
    if lower.contains("yes") || lower.contains("certain") {
        "✅"
    } else if lower.contains("no") || lower.contains("not") {
        "❌"
    } else if lower.contains("maybe") || lower.contains("later") {
        "🤔"
    } else {
        "🎱"
    }
}

fn pick() -> &'static str {
    RESPONSES
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(RESPONSES[0])
}

pub fn answer_embed(question: &str, answer: &str, asker: &str) -> Embed {
    Embed::new("🎱 The Magic 8-Ball")
        .color(answer_color(answer))
        .timestamp(Utc::now())
        .field("❓ Your Question", code_block(question), false)
        .field("🎯 Answer", format!("**{answer}**"), false)
        .footer(format!("{} Asked by {asker}", answer_emoji(answer)))
}

pub struct EightBall;

#[async_trait]
impl CommandHandler for EightBall {
    fn spec(&self) -> CommandSpec {
        CommandSpec::new("8ball", "Ask the magic 8-ball a question").param(ParamSpec::required(
            "question",
            "Your question for the magic 8-ball",
            ParamKind::String,
        ))
    }

    async fn run(&self, _ctx: &CommandContext, inv: &Invocation) -> Result<Reply> {
        let question = inv.require_string("question")?;
        Ok(Reply::embed(answer_embed(
            question,
            pick(),
            &inv.actor.user.name,
        )))
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashSet, sync::Arc};

    use super::*;
    use crate::{
        commands::OptionValue,
        testing::{actor, channel, context, FakePlatform},
    };

    #[test]
    fn colors_follow_keywords() {
        assert_eq!(answer_color("Yes"), COLOR_GREEN);
        assert_eq!(answer_color("It is certain"), COLOR_GREEN);
        assert_eq!(answer_color("Without a doubt"), COLOR_GREEN);
        assert_eq!(answer_color("My sources say no"), COLOR_RED);
        assert_eq!(answer_color("Very unlikely"), COLOR_RED);
        assert_eq!(answer_color("Very Doubtful"), COLOR_RED);
        assert_eq!(answer_color("Maybe"), COLOR_YELLOW);
        assert_eq!(answer_color("Ask again later"), COLOR_YELLOW);
        // Substring match: "Gi-no's" counts as negative.
        assert_eq!(answer_color("Gino's mom told me yes"), COLOR_RED);
    }

    #[test]
    fn emoji_follows_keywords() {
        assert_eq!(answer_emoji("Yes"), "✅");
        assert_eq!(answer_emoji("Not even close"), "❌");
        assert_eq!(answer_emoji("Ask again later"), "🤔");
        assert_eq!(answer_emoji("Outlook good"), "🎱");
    }

    #[test]
    fn every_response_is_eventually_picked() {
        let mut seen = HashSet::new();
        for _ in 0..5_000 {
            seen.insert(pick());
        }
        assert_eq!(seen.len(), RESPONSES.len());
    }

    #[tokio::test]
    async fn reply_quotes_the_question() {
        let ctx = context(Arc::new(FakePlatform::new()));
        let inv = Invocation::new("8ball", actor(false), channel(1))
            .option("question", OptionValue::String("Will it snow?".into()));

        let embed = EightBall.run(&ctx, &inv).await.unwrap().embed.unwrap();
        assert_eq!(embed.title.as_deref(), Some("🎱 The Magic 8-Ball"));
        assert_eq!(embed.field_value("❓ Your Question"), Some("```Will it snow?```"));
        let answer = embed.field_value("🎯 Answer").unwrap();
        let bare = answer.trim_matches('*');
        assert!(RESPONSES.contains(&bare));
        assert_eq!(embed.color, Some(answer_color(bare)));
        assert!(embed.footer.unwrap().ends_with("Asked by frosty"));
    }

    #[tokio::test]
    async fn missing_question_is_an_error() {
        let ctx = context(Arc::new(FakePlatform::new()));
        let inv = Invocation::new("8ball", actor(false), channel(1));
        assert!(EightBall.run(&ctx, &inv).await.is_err());
    }
}
