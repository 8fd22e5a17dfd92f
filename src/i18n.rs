//! User-facing message text in the supported languages.

use crate::domain::{CurrencyKind, Faction, Language};
use crate::engine::{EconomyError, TierLabel};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    DailyClaimed { fund: i64, coupon: i64 },
    Exchanged { amount: i64 },
    Transferred { amount: i64, kind: CurrencyKind, to: String },
    Credited { amount: i64, kind: CurrencyKind, to: String },
    WagerWon { multiplier: i64, stake: i64 },
    WagerLost { stake: i64 },
    LevelUp { level: u32, reward: i64 },
    RankUp(TierLabel),
    LanguageChanged,
    FactionJoined(Faction),
    FactionLeft(Faction),
    FactionUnchanged,
    OrderFinished { succeeded: u32, requested: u32 },
    Rejected(EconomyError),
    StoreUnavailable,
    NotOwner,
}

/// Group digits in thousands: `12345` becomes `12,345`.
pub fn format_amount(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if amount < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn currency_name(kind: CurrencyKind) -> &'static str {
    match kind {
        CurrencyKind::Fund => "Fund",
        CurrencyKind::Coupon => "Coupon",
    }
}

impl Message {
    pub fn render(&self, lang: Language) -> String {
        match lang {
            Language::Vi => self.vi(),
            Language::En => self.en(),
        }
    }

    fn vi(&self) -> String {
        match self {
            Message::DailyClaimed { fund, coupon } => format!(
                "✅ Điểm danh thành công! Nhận được: +{} Fund & +{} Coupon",
                format_amount(*fund),
                format_amount(*coupon)
            ),
            Message::Exchanged { amount } => {
                format!("✅ Đã đổi {} Coupon sang Fund.", format_amount(*amount))
            }
            Message::Transferred { amount, kind, to } => format!(
                "✅ Đã chuyển {} {} cho {}.",
                format_amount(*amount),
                currency_name(*kind),
                to
            ),
            Message::Credited { amount, kind, to } => format!(
                "✅ Đã thêm {} {} cho {}.",
                format_amount(*amount),
                currency_name(*kind),
                to
            ),
            Message::WagerWon { multiplier, stake } => format!(
                "🎉 THẮNG LỚN! Bạn đã trúng x{} số tiền cược {}.",
                multiplier,
                format_amount(*stake)
            ),
            Message::WagerLost { stake } => {
                format!("💀 THUA CƯỢC! Bạn mất {} tiền cược.", format_amount(*stake))
            }
            Message::LevelUp { level, reward } => format!(
                "🎉 Chúc mừng! Bạn đã thăng cấp lên Level {}! Thưởng: +{} Fund",
                level,
                format_amount(*reward)
            ),
            Message::RankUp(tier) => format!("🌟 Bạn đã được thăng cấp Rank thành {}!", tier),
            Message::LanguageChanged => {
                "✅ Ngôn ngữ của bạn đã được đổi thành Tiếng Việt.".to_string()
            }
            Message::FactionJoined(f) => format!("✅ Bạn đã gia nhập nhóm {}.", f),
            Message::FactionLeft(f) => format!("✅ Bạn đã rời nhóm {}.", f),
            Message::FactionUnchanged => "Nhóm của bạn không thay đổi.".to_string(),
            Message::OrderFinished {
                succeeded,
                requested,
            } => format!("✅ Đã đặt thành công {}/{} gói.", succeeded, requested),
            Message::Rejected(err) => match err {
                EconomyError::InvalidAmount(_) => "❌ Số tiền phải lớn hơn 0.".to_string(),
                EconomyError::InsufficientFunds { kind, .. } => {
                    format!("❌ Bạn không đủ {}.", currency_name(*kind))
                }
                EconomyError::SelfTransfer => "❌ Bạn không thể tự chuyển cho mình.".to_string(),
                EconomyError::AlreadyClaimed => "⏳ Bạn đã điểm danh hôm nay rồi!".to_string(),
                EconomyError::EmptyBalance(kind) | EconomyError::StakeTooSmall(kind) => {
                    format!("❌ Bạn không có đủ {} để cược.", currency_name(*kind))
                }
                EconomyError::BalanceOverflow(kind) => {
                    format!("❌ Số dư {} vượt quá giới hạn.", currency_name(*kind))
                }
            },
            Message::StoreUnavailable => "❌ Lỗi cơ sở dữ liệu. Vui lòng thử lại sau.".to_string(),
            Message::NotOwner => "⛔ Lệnh này chỉ dành cho Owner của Bot.".to_string(),
        }
    }

    fn en(&self) -> String {
        match self {
            Message::DailyClaimed { fund, coupon } => format!(
                "✅ Daily reward claimed! You received: +{} Fund & +{} Coupon",
                format_amount(*fund),
                format_amount(*coupon)
            ),
            Message::Exchanged { amount } => {
                format!("✅ Exchanged {} Coupon for Fund.", format_amount(*amount))
            }
            Message::Transferred { amount, kind, to } => format!(
                "✅ Transferred {} {} to {}.",
                format_amount(*amount),
                currency_name(*kind),
                to
            ),
            Message::Credited { amount, kind, to } => format!(
                "✅ Added {} {} to {}.",
                format_amount(*amount),
                currency_name(*kind),
                to
            ),
            Message::WagerWon { multiplier, stake } => format!(
                "🎉 BIG WIN! You hit x{} on your bet of {}.",
                multiplier,
                format_amount(*stake)
            ),
            Message::WagerLost { stake } => {
                format!("💀 BET LOST! You lost your bet of {}.", format_amount(*stake))
            }
            Message::LevelUp { level, reward } => format!(
                "🎉 Congratulations! You have leveled up to Level {}! Reward: +{} Fund",
                level,
                format_amount(*reward)
            ),
            Message::RankUp(tier) => format!("🌟 You have been promoted to {} rank!", tier),
            Message::LanguageChanged => "✅ Your language has been changed to English.".to_string(),
            Message::FactionJoined(f) => format!("✅ You joined the {} group.", f),
            Message::FactionLeft(f) => format!("✅ You left the {} group.", f),
            Message::FactionUnchanged => "Your group is unchanged.".to_string(),
            Message::OrderFinished {
                succeeded,
                requested,
            } => format!("✅ Placed {}/{} packages.", succeeded, requested),
            Message::Rejected(err) => match err {
                EconomyError::InvalidAmount(_) => "❌ Amount must be greater than 0.".to_string(),
                EconomyError::InsufficientFunds { kind, .. } => {
                    format!("❌ You do not have enough {}.", currency_name(*kind))
                }
                EconomyError::SelfTransfer => "❌ You cannot transfer to yourself.".to_string(),
                EconomyError::AlreadyClaimed => {
                    "⏳ You have already claimed your daily reward today!".to_string()
                }
                EconomyError::EmptyBalance(kind) | EconomyError::StakeTooSmall(kind) => {
                    format!("❌ You do not have enough {} to bet.", currency_name(*kind))
                }
                EconomyError::BalanceOverflow(kind) => {
                    format!("❌ Your {} balance would exceed the limit.", currency_name(*kind))
                }
            },
            Message::StoreUnavailable => "❌ Database error. Please try again later.".to_string(),
            Message::NotOwner => "⛔ This command is for the Bot Owner only.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_amount_groups_thousands() {
        assert_eq!(format_amount(0), "0");
        assert_eq!(format_amount(999), "999");
        assert_eq!(format_amount(1000), "1,000");
        assert_eq!(format_amount(12345678), "12,345,678");
        assert_eq!(format_amount(-14000), "-14,000");
    }

    #[test]
    fn test_messages_follow_language() {
        let msg = Message::Exchanged { amount: 5000 };
        assert_eq!(msg.render(Language::En), "✅ Exchanged 5,000 Coupon for Fund.");
        assert_eq!(msg.render(Language::Vi), "✅ Đã đổi 5,000 Coupon sang Fund.");
    }

    #[test]
    fn test_rejection_names_currency() {
        let msg = Message::Rejected(EconomyError::InsufficientFunds {
            kind: CurrencyKind::Fund,
            balance: 0,
            requested: 10,
        });
        assert!(msg.render(Language::En).contains("enough Fund"));
    }
}
