//! Scripted assistant replies.
//!
//! `respond` is a total lookup over `ConversationStage`: each stage has at
//! most one rule, and stages without a rule get the fallback reply and keep
//! their stage. Adding a stage reply means adding a row to `STAGE_RULES`.

use serde::Serialize;

use crate::models::enums::ConversationStage;

/// First assistant message of every new session.
pub const GREETING_MESSAGE: &str = "こんにちは！Theta Clinical Supportのリサーチ参加アシスタントです。\n\n臨床研究への参加をご検討いただき、ありがとうございます。24時間365日、いつでもご相談をお受けしています。\n\nどのような研究への参加をご希望ですか？";

/// Asks for the four basic eligibility fields.
pub const PRESCREENING_REQUEST: &str = "承知いたしました。まず、基本的な参加条件を確認させていただきます。\n\n以下の情報をお教えください：\n1. 年齢\n2. 性別\n3. 現在お住まいの地域\n4. 参加可能な研究形式（オンライン調査/対面インタビュー/実験参加）";

/// Lists the two open example studies.
pub const STUDY_LISTING: &str = "ありがとうございます。お客様の条件に合う研究をAIマッチングシステムで検索しています...\n\n現在、以下の研究で参加者を募集しています：\n- オンライン調査（所要時間：30分、謝礼：3,000円）\n- 対面インタビュー（所要時間：60分、謝礼：8,000円）\n\nご興味のある研究はございますか？";

/// "Sorry, please tell me again."
pub const FALLBACK_REPLY: &str = "申し訳ございません。もう一度お聞かせください。";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Reply {
    pub text: &'static str,
    pub next_stage: ConversationStage,
}

struct StageRule {
    stage: ConversationStage,
    reply: &'static str,
    /// `None` keeps the current stage.
    advance_to: Option<ConversationStage>,
}

const STAGE_RULES: &[StageRule] = &[
    StageRule {
        stage: ConversationStage::Greeting,
        reply: PRESCREENING_REQUEST,
        advance_to: Some(ConversationStage::Prescreening),
    },
    StageRule {
        stage: ConversationStage::Prescreening,
        reply: STUDY_LISTING,
        advance_to: None,
    },
];

/// Compute the assistant reply for one turn.
///
/// The input is only checked for presence; its wording never changes the
/// outcome. Blank input is not a turn and yields the fallback with the stage
/// unchanged (callers are expected to gate it out first).
pub fn respond(user_input: &str, stage: ConversationStage) -> Reply {
    let fallback = Reply {
        text: FALLBACK_REPLY,
        next_stage: stage,
    };

    if user_input.trim().is_empty() {
        return fallback;
    }

    STAGE_RULES
        .iter()
        .find(|rule| rule.stage == stage)
        .map(|rule| Reply {
            text: rule.reply,
            next_stage: rule.advance_to.unwrap_or(stage),
        })
        .unwrap_or(fallback)
}
