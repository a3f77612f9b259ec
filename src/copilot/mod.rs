//! Scripted AI helper: a stateless keyword matcher over canned response
//! templates, plus a transcript wrapper that simulates the typing delay.
//! Replies are pure string templating; there is no inference anywhere.

use std::time::Duration;

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use uuid::Uuid;

use crate::device::WaterLevel;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ViewContext {
    Device,
    Manual,
    Preset,
    ProgramDetail,
    Data,
    Learn,
    My,
    ImmersiveSession,
}

impl Default for ViewContext {
    fn default() -> Self {
        ViewContext::Device
    }
}

impl ViewContext {
    pub fn display_name(&self) -> &'static str {
        match self {
            ViewContext::Device => "Device Dashboard",
            ViewContext::Manual => "Manual Control",
            ViewContext::Preset => "Program Selection",
            ViewContext::ProgramDetail => "Program Details",
            ViewContext::Data => "Session History",
            ViewContext::Learn => "Learning Center",
            ViewContext::My => "Profile Settings",
            ViewContext::ImmersiveSession => "Active Session",
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            ViewContext::Device => "device",
            ViewContext::Manual => "manual",
            ViewContext::Preset => "preset",
            ViewContext::ProgramDetail => "program_detail",
            ViewContext::Data => "data",
            ViewContext::Learn => "learn",
            ViewContext::My => "my",
            ViewContext::ImmersiveSession => "immersive_session",
        }
    }
}

/// Screen context handed to the matcher so templates can interpolate the
/// user's current settings.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CopilotContext {
    pub view: ViewContext,
    pub water_level: Option<WaterLevel>,
    pub temperature: Option<i32>,
    pub compression_level: Option<u8>,
    pub duration_min: Option<u32>,
    pub program_name: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

/// Produce the scripted reply for a user message in a given screen
/// context. View-specific rules run first, then the general fallbacks,
/// mirroring the prototype's matcher order.
pub fn generate_reply(ctx: &CopilotContext, input: &str) -> String {
    let message = input.to_lowercase();

    if ctx.view == ViewContext::Device {
        if contains_any(&message, &["how", "start", "use"]) {
            return "To start a therapy session, you can either:\n\n1. **Choose a Preset Program**: Tap 'Preset Programs' and select from our official recovery programs like 'Contrast Recovery' or 'Deep Cold Therapy'.\n\n2. **Manual Control**: Switch to 'Manual Control' to customize your own session with specific temperature, compression, and duration settings.\n\nWould you like help choosing the right program for your needs?".to_string();
        }
        if contains_any(&message, &["program", "routine"]) {
            return "I can help you understand our programs:\n\n• **Contrast Recovery**: Alternates hot and cold therapy to boost circulation\n• **Deep Cold Therapy**: Focused cold treatment for inflammation\n• **Warm Recovery**: Gentle heat therapy for muscle relaxation\n\nYou can also create custom routines by tapping the '+' icon. What type of recovery are you looking for?".to_string();
        }
        if contains_any(&message, &["water", "level"]) {
            let level = match ctx.water_level {
                Some(WaterLevel::Low) => "low",
                Some(WaterLevel::High) => "high",
                _ => "normal",
            };
            return format!(
                "Your current water level is {level}. For optimal performance:\n\n• Keep water level between MIN and MAX marks\n• Refill when indicator shows LOW\n• Use distilled or filtered water\n• Clean tank weekly\n\nNeed help with maintenance?"
            );
        }
    }

    if ctx.view == ViewContext::Manual {
        if contains_any(&message, &["temperature", "temp", "cold", "hot"]) {
            let temp = ctx
                .temperature
                .map(|t| format!("{t}"))
                .unwrap_or_else(|| "not set".to_string());
            return format!(
                "You're in Manual Mode. Current temperature is set to {temp}°C.\n\n**Temperature Guidelines:**\n• Cold therapy: 5-15°C (reduces inflammation)\n• Heat therapy: 35-42°C (relaxes muscles)\n\nAdjust using the slider to find your comfort zone. Start conservative and adjust as needed!"
            );
        }
        if contains_any(&message, &["compression", "pressure"]) {
            let level = ctx
                .compression_level
                .map(|l| format!("{l}"))
                .unwrap_or_else(|| "not set".to_string());
            return format!(
                "Current compression level: {level}\n\n**Compression Levels:**\n• Level 0: Off\n• Level 1-2: Light (recovery/relaxation)\n• Level 3-4: Strong (deep tissue work)\n\n**Modes:**\n• Overall: Uniform pressure\n• Flow: Sequential gradient\n• Wave: Rhythmic pulsing\n\nWhat intensity feels right for you?"
            );
        }
        if contains_any(&message, &["duration", "time", "long"]) {
            return "**Recommended Session Durations:**\n\n• Cold therapy: 10-20 minutes\n• Heat therapy: 15-30 minutes\n• Compression only: 20-60 minutes\n\nListen to your body! Start with shorter sessions and gradually increase as you adapt.".to_string();
        }
    }

    if ctx.view == ViewContext::ProgramDetail {
        let program_name = ctx
            .program_name
            .clone()
            .unwrap_or_else(|| "this program".to_string());
        return format!(
            "You're viewing \"{program_name}\".\n\nThis program includes multiple segments designed for optimal recovery. Each segment has specific temperature and compression settings.\n\n**Tips:**\n• Review the timeline to see what to expect\n• You can adjust parameters during the session\n• Save to favorites for quick access\n\nReady to start? Tap the 'Start Program' button!"
        );
    }

    if ctx.view == ViewContext::Data {
        return "Your session history shows your recovery journey!\n\n**Insights:**\n• Track completion rates to stay motivated\n• Notice patterns in your recovery routine\n• Compare different programs' effectiveness\n\nConsistent recovery leads to better performance. Keep it up!".to_string();
    }

    if ctx.view == ViewContext::Learn {
        return "The Learn section has science-backed articles and guides:\n\n• **Science**: Understanding the 'why' behind therapy\n• **Recovery**: Best practices and protocols\n• **Device**: Setup and maintenance guides\n\nKnowledge is power! What would you like to learn about?".to_string();
    }

    if contains_any(&message, &["help", "what"]) {
        return "I'm your 3Covery AI assistant! I can help you with:\n\n• Choosing the right therapy program\n• Understanding temperature and compression settings\n• Troubleshooting device issues\n• Learning about recovery science\n• Creating custom routines\n\nWhat would you like to know?".to_string();
    }

    if contains_any(&message, &["pain", "sore", "injury"]) {
        return "For pain and soreness:\n\n**Acute (recent injury):**\n• Use cold therapy (10-15°C)\n• 15-20 minute sessions\n• Reduces inflammation\n\n**Chronic (ongoing soreness):**\n• Try contrast therapy\n• Alternates hot and cold\n• Improves circulation\n\n⚠️ **Important**: If pain is severe or persistent, consult a healthcare professional.".to_string();
    }

    if message.contains("thank") {
        return "You're welcome! I'm here whenever you need guidance. Happy recovering! 💪".to_string();
    }

    let system_context = format!(
        "User is currently on {} screen. Data: {}",
        ctx.view.as_str(),
        serde_json::to_string(ctx).unwrap_or_default()
    );
    format!(
        "I'm analyzing your current view ({}). {system_context}\n\nI can help you with:\n• Understanding your current settings\n• Choosing the right therapy\n• Optimizing your recovery routine\n\nWhat specific question do you have?",
        ctx.view.as_str()
    )
}

/// One chat conversation. Independent of the session machine; the typing
/// delay is a free-standing timer with no shared state.
pub struct Copilot {
    messages: Vec<Message>,
    typing_delay: Duration,
}

impl Default for Copilot {
    fn default() -> Self {
        Self::new()
    }
}

impl Copilot {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            typing_delay: Duration::from_millis(800),
        }
    }

    pub fn with_typing_delay(mut self, delay: Duration) -> Self {
        self.typing_delay = delay;
        self
    }

    /// The helper is hidden while a session runs full-screen.
    pub fn is_available(view: ViewContext) -> bool {
        view != ViewContext::ImmersiveSession
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Send a user message and wait for the scripted reply.
    pub async fn ask(&mut self, ctx: &CopilotContext, input: &str) -> Result<Message> {
        if !Self::is_available(ctx.view) {
            bail!("assistant is unavailable during an active session");
        }
        let input = input.trim();
        if input.is_empty() {
            bail!("empty message");
        }

        self.messages.push(Message {
            id: format!("msg-{}", Uuid::new_v4()),
            role: Role::User,
            content: input.to_string(),
            timestamp: Utc::now(),
        });

        sleep(self.typing_delay).await;

        let reply = Message {
            id: format!("msg-{}-ai", Uuid::new_v4()),
            role: Role::Assistant,
            content: generate_reply(ctx, input),
            timestamp: Utc::now(),
        };
        self.messages.push(reply.clone());
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manual_ctx() -> CopilotContext {
        CopilotContext {
            view: ViewContext::Manual,
            temperature: Some(10),
            compression_level: Some(2),
            duration_min: Some(15),
            ..CopilotContext::default()
        }
    }

    #[test]
    fn manual_temperature_question_interpolates_setting() {
        let reply = generate_reply(&manual_ctx(), "is this temp ok?");
        assert!(reply.contains("set to 10°C"));
        assert!(reply.contains("5-15°C"));
    }

    #[test]
    fn manual_compression_question_reports_level() {
        let reply = generate_reply(&manual_ctx(), "how strong is the pressure");
        assert!(reply.contains("Current compression level: 2"));
    }

    #[test]
    fn device_view_answers_getting_started() {
        let ctx = CopilotContext::default();
        let reply = generate_reply(&ctx, "How do I start a session?");
        assert!(reply.contains("Preset Program"));
        assert!(reply.contains("Manual Control"));
    }

    #[test]
    fn water_question_uses_reported_level() {
        let ctx = CopilotContext {
            water_level: Some(WaterLevel::Low),
            ..CopilotContext::default()
        };
        let reply = generate_reply(&ctx, "water?");
        assert!(reply.contains("water level is low"));
    }

    #[test]
    fn program_detail_names_the_program() {
        let ctx = CopilotContext {
            view: ViewContext::ProgramDetail,
            program_name: Some("Contrast Recovery".to_string()),
            ..CopilotContext::default()
        };
        let reply = generate_reply(&ctx, "tell me more");
        assert!(reply.contains("\"Contrast Recovery\""));
    }

    #[test]
    fn thanks_gets_a_sign_off() {
        let ctx = CopilotContext::default();
        // keyword checks run against the lowercased message
        let reply = generate_reply(&ctx, "THANK you so much");
        assert!(reply.contains("You're welcome"));
    }

    #[test]
    fn unknown_question_falls_back_to_context_dump() {
        let ctx = CopilotContext {
            view: ViewContext::My,
            ..CopilotContext::default()
        };
        let reply = generate_reply(&ctx, "zzz");
        assert!(reply.contains("analyzing your current view (my)"));
        assert!(reply.contains("\"view\":\"my\""));
    }

    #[tokio::test]
    async fn ask_appends_both_sides_of_the_exchange() {
        let mut copilot = Copilot::new().with_typing_delay(Duration::from_millis(1));
        let ctx = CopilotContext::default();

        let reply = copilot.ask(&ctx, "help").await.unwrap();
        assert_eq!(reply.role, Role::Assistant);
        assert_eq!(copilot.messages().len(), 2);
        assert_eq!(copilot.messages()[0].role, Role::User);
        assert_eq!(copilot.messages()[0].content, "help");
    }

    #[tokio::test]
    async fn ask_is_rejected_during_a_session_and_for_empty_input() {
        let mut copilot = Copilot::new().with_typing_delay(Duration::from_millis(1));
        let session_ctx = CopilotContext {
            view: ViewContext::ImmersiveSession,
            ..CopilotContext::default()
        };
        assert!(copilot.ask(&session_ctx, "help").await.is_err());
        assert!(copilot
            .ask(&CopilotContext::default(), "   ")
            .await
            .is_err());
        assert!(copilot.messages().is_empty());
    }
}
