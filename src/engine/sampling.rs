// ==========================================
// DCP 追踪系统 - 质检抽样规则引擎
// ==========================================
// 规则:
// - 批次抽检卡数 = ceil(数量 / 50)
// - 单卡种质检: ceil(数量 / 50)
// - 多卡种质检: ≤50 → 1, ≤100 → 2, 其余 → 3
// ==========================================

use crate::domain::quality::CardTypeEntry;

/// 抽样基数：每 50 张抽 1 张
pub const SAMPLING_BATCH_SIZE: u32 = 50;

#[derive(Debug, Default)]
pub struct SamplingEngine {}

impl SamplingEngine {
    pub fn new() -> Self {
        Self {}
    }

    /// 批次级应抽检卡数
    pub fn lot_cards_to_test(&self, quantity: u32) -> u32 {
        quantity.div_ceil(SAMPLING_BATCH_SIZE)
    }

    /// 单个卡种的抽检数量
    ///
    /// # 参数
    /// - quantity: 该卡种数量
    /// - selected_type_count: 本次质检选择的卡种数
    pub fn card_type_sample_size(&self, quantity: u32, selected_type_count: usize) -> u32 {
        if selected_type_count == 1 {
            return quantity.div_ceil(SAMPLING_BATCH_SIZE);
        }
        match quantity {
            0..=50 => 1,
            51..=100 => 2,
            _ => 3,
        }
    }

    /// 对一次质检录入的全部卡种计算抽检数量
    ///
    /// # 返回
    /// (每卡种抽检数量, 合计)
    pub fn sample_sizes(&self, entries: &[CardTypeEntry]) -> (Vec<u32>, u32) {
        let sizes: Vec<u32> = entries
            .iter()
            .map(|e| self.card_type_sample_size(e.quantity, entries.len()))
            .collect();
        let total = sizes.iter().sum();
        (sizes, total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lot_cards_to_test_rounds_up() {
        let engine = SamplingEngine::new();
        assert_eq!(engine.lot_cards_to_test(1), 1);
        assert_eq!(engine.lot_cards_to_test(50), 1);
        assert_eq!(engine.lot_cards_to_test(51), 2);
        assert_eq!(engine.lot_cards_to_test(1000), 20);
    }

    #[test]
    fn test_single_card_type_uses_ratio() {
        let engine = SamplingEngine::new();
        assert_eq!(engine.card_type_sample_size(420, 1), 9);
    }

    #[test]
    fn test_multiple_card_types_use_steps() {
        let engine = SamplingEngine::new();
        assert_eq!(engine.card_type_sample_size(50, 2), 1);
        assert_eq!(engine.card_type_sample_size(51, 2), 2);
        assert_eq!(engine.card_type_sample_size(100, 3), 2);
        assert_eq!(engine.card_type_sample_size(5000, 3), 3);
    }

    #[test]
    fn test_sample_sizes_total() {
        let engine = SamplingEngine::new();
        let entries = vec![
            CardTypeEntry {
                card_type: "visa gold premier".to_string(),
                quantity: 30,
            },
            CardTypeEntry {
                card_type: "challenge".to_string(),
                quantity: 240,
            },
        ];
        let (sizes, total) = engine.sample_sizes(&entries);
        assert_eq!(sizes, vec![1, 3]);
        assert_eq!(total, 4);
    }
}
