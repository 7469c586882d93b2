//! Static push-message catalog, keyed by time-of-day slot.
//!
//! Each slot is a successively later checkpoint in the day; `deadline` is
//! the last-chance escalation and `recovery` re-engages users whose streak
//! already expired. Message bodies may embed `{streak}` and `{remaining}`
//! placeholders, substituted at selection time.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Time-of-day notification slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Slot {
    Morning,
    Lunch,
    Evening,
    Night,
    Final,
    Deadline,
    Recovery,
}

impl Slot {
    pub const ALL: [Slot; 7] = [
        Slot::Morning,
        Slot::Lunch,
        Slot::Evening,
        Slot::Night,
        Slot::Final,
        Slot::Deadline,
        Slot::Recovery,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Slot::Morning => "morning",
            Slot::Lunch => "lunch",
            Slot::Evening => "evening",
            Slot::Night => "night",
            Slot::Final => "final",
            Slot::Deadline => "deadline",
            Slot::Recovery => "recovery",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Slot {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "morning" => Ok(Slot::Morning),
            "lunch" => Ok(Slot::Lunch),
            "evening" => Ok(Slot::Evening),
            "night" => Ok(Slot::Night),
            "final" => Ok(Slot::Final),
            "deadline" => Ok(Slot::Deadline),
            "recovery" => Ok(Slot::Recovery),
            other => Err(CoreError::InvalidSlot(other.to_string())),
        }
    }
}

/// How strongly a message leans on the user's streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StreakPriority {
    VeryHigh,
    High,
    Medium,
    Low,
}

/// One catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PushMessage {
    /// Unique short code, e.g. `N03`.
    pub id: &'static str,
    pub title: &'static str,
    pub body: &'static str,
    pub streak_priority: Option<StreakPriority>,
    /// Only meaningful for users with a daily goal set.
    pub requires_goal: bool,
}

const fn msg(id: &'static str, title: &'static str, body: &'static str) -> PushMessage {
    PushMessage {
        id,
        title,
        body,
        streak_priority: None,
        requires_goal: false,
    }
}

const fn prio(
    id: &'static str,
    title: &'static str,
    body: &'static str,
    priority: StreakPriority,
) -> PushMessage {
    PushMessage {
        id,
        title,
        body,
        streak_priority: Some(priority),
        requires_goal: false,
    }
}

const fn goal(id: &'static str, title: &'static str, body: &'static str) -> PushMessage {
    PushMessage {
        id,
        title,
        body,
        streak_priority: None,
        requires_goal: true,
    }
}

use StreakPriority::{High, Low, Medium, VeryHigh};

const MORNING: &[PushMessage] = &[
    prio("M01", "🌅 おはよう！", "今日も{streak}日目を積み上げよう！", High),
    prio("M02", "☀️ 新しい1日！", "朝の5分が合格への近道だよ", Low),
    prio("M03", "🐱 すとりーより", "おはよ！今日も一緒に頑張ろうね", Low),
    prio("M04", "📚 朝活のチャンス", "通勤前にサクッと1問どう？", Low),
    prio("M05", "🔥 {streak}日連続！", "この調子で今日も続けよう！", High),
    prio("M06", "💪 Good Morning!", "IT資格、今日も一歩前進しよう", Low),
];

const LUNCH: &[PushMessage] = &[
    msg("L01", "🍱 ランチタイム！", "食後の3分で1問解いてみない？"),
    msg("L02", "☕ 休憩中？", "ちょっとだけIT Streakやろ！"),
    msg("L03", "🐱 すとりーだよ", "お昼休み、一緒に勉強しよ？"),
    msg("L04", "📱 スキマ時間に", "今日の学習、まだ間に合うよ！"),
    goal("L05", "🎯 今日の目標", "あと{remaining}問で達成！"),
];

const EVENING: &[PushMessage] = &[
    prio("E01", "🏠 おかえり！", "今日の学習、まだだよ？", Low),
    prio("E02", "📱 忘れてない？", "{streak}日のストリーク、守ろう！", High),
    prio("E03", "🐱 すとりーより", "今日まだ会えてないよ...？", Low),
    prio("E04", "⏰ 夜になる前に", "5問だけやっておこう！", Low),
    prio("E05", "🔥 ストリーク継続中", "あと5時間、今のうちに！", High),
    prio("E06", "💼 お疲れさま！", "疲れた日こそ1問だけ！", Low),
];

const NIGHT: &[PushMessage] = &[
    prio("N01", "⚠️ あと2時間半！", "{streak}日のストリークが...！", VeryHigh),
    prio("N02", "😿 すとりーが心配", "今日の学習、忘れてない...？", Medium),
    prio("N03", "🔥 ストリーク危機", "まだ間に合う！今すぐタップ！", Low),
    prio("N04", "⏰ 時間がないよ", "{streak}日間の努力、無駄にしないで", VeryHigh),
    prio("N05", "📉 このままだと...", "ストリークがリセットされちゃう", VeryHigh),
    prio("N06", "🐱 すとりーより", "ねえ、今日も頑張ったって言いたいな...", Low),
];

const FINAL: &[PushMessage] = &[
    prio("F01", "🚨 あと45分！", "{streak}日のストリーク、消えちゃう！", High),
    prio("F02", "😭 すとりーより", "お願い...今日が終わっちゃう...", Medium),
    prio("F03", "⏰ ラストチャンス！", "1問だけでいい、タップして！", Low),
    prio("F04", "💔 {streak}日間が...", "あと少しで全部消えちゃうよ", High),
    prio("F05", "🆘 緊急！", "今すぐ開いて！間に合う！", Low),
    prio("F06", "🐱 すとりー泣いてる", "今日も一緒に頑張りたかったのに...", Medium),
];

const DEADLINE: &[PushMessage] = &[
    prio("D01", "🚨 あと10分！！", "今すぐ開いて！！", Low),
    prio("D02", "😭 お願い...！", "{streak}日が消えちゃう...！", High),
    prio("D03", "⏰ 10分で終わる", "1問だけ！今すぐ！", Low),
    prio("D04", "💔 すとりーより", "最後のお願い...開いて...", Medium),
    prio("D05", "🆘 {streak}日間！", "全部消える前に...！", High),
    prio("D06", "😿 間に合って...！", "あと10分しかないよ...！", Low),
];

const RECOVERY: &[PushMessage] = &[
    msg("R01", "🐱 すとりーより", "また一緒に始めよう！待ってるよ"),
    msg("R02", "🌱 新しいスタート！", "今日から新しいストリークを作ろう"),
    msg("R03", "💪 大丈夫！", "何度でもやり直せる！今日から再開しよう"),
];

/// All catalog entries for a slot, in catalog order. Never empty.
pub fn messages_for(slot: Slot) -> &'static [PushMessage] {
    match slot {
        Slot::Morning => MORNING,
        Slot::Lunch => LUNCH,
        Slot::Evening => EVENING,
        Slot::Night => NIGHT,
        Slot::Final => FINAL,
        Slot::Deadline => DEADLINE,
        Slot::Recovery => RECOVERY,
    }
}

/// Find a catalog entry by id within a slot.
pub fn message_by_id(slot: Slot, id: &str) -> Option<&'static PushMessage> {
    messages_for(slot).iter().find(|m| m.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn slot_names_roundtrip() {
        for slot in Slot::ALL {
            assert_eq!(slot.as_str().parse::<Slot>().unwrap(), slot);
        }
    }

    #[test]
    fn unknown_slot_is_rejected() {
        let err = "midnight".parse::<Slot>().unwrap_err();
        assert!(matches!(err, CoreError::InvalidSlot(ref s) if s == "midnight"));
    }

    #[test]
    fn every_slot_has_messages() {
        for slot in Slot::ALL {
            assert!(!messages_for(slot).is_empty(), "slot {slot} is empty");
        }
    }

    #[test]
    fn message_ids_are_globally_unique() {
        let mut seen = HashSet::new();
        for slot in Slot::ALL {
            for message in messages_for(slot) {
                assert!(seen.insert(message.id), "duplicate id {}", message.id);
            }
        }
    }

    #[test]
    fn goal_flag_only_in_lunch() {
        for slot in Slot::ALL {
            for message in messages_for(slot) {
                if message.requires_goal {
                    assert_eq!(slot, Slot::Lunch, "{} requires a goal", message.id);
                }
            }
        }
    }

    #[test]
    fn recovery_messages_carry_no_streak_placeholder() {
        for message in messages_for(Slot::Recovery) {
            assert!(!message.title.contains("{streak}"));
            assert!(!message.body.contains("{streak}"));
        }
    }
}
