// ==========================================
// DCP 追踪系统 - 界面文案
// ==========================================
// 文案文件: locales/*.yml（rust-i18n，宏在 lib.rs 中初始化）
// 现场语言为法语；英语用于开发与支持
// ==========================================

/// 默认语言
pub const DEFAULT_LOCALE: &str = "fr";

/// 已提供文案的语言
pub const SUPPORTED_LOCALES: [&str; 2] = ["fr", "en"];

pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// 切换语言；不支持的语言回退到法语
///
/// # 返回
/// 实际生效的语言代码
pub fn set_locale(locale: &str) -> &'static str {
    let effective = SUPPORTED_LOCALES
        .iter()
        .copied()
        .find(|l| l.eq_ignore_ascii_case(locale.trim()))
        .unwrap_or_else(|| {
            tracing::warn!(locale, "不支持的语言，回退到默认语言");
            DEFAULT_LOCALE
        });
    rust_i18n::set_locale(effective);
    effective
}

/// 取文案
///
/// ```no_run
/// let label = dcp_tracker::i18n::t("shipment.courier_unassigned");
/// ```
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// 取文案并替换 `%{name}` 占位符
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    args.iter()
        .fold(rust_i18n::t!(key).to_string(), |text, (name, value)| {
            text.replace(&format!("%{{{}}}", name), value)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // 语言为进程级全局状态，相关测试串行执行
    static LOCALE_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_set_locale_falls_back() {
        let _guard = LOCALE_LOCK.lock().unwrap();
        assert_eq!(set_locale("EN"), "en");
        assert_eq!(current_locale(), "en");

        assert_eq!(set_locale("wo"), "fr");
        assert_eq!(current_locale(), "fr");
    }

    #[test]
    fn test_placeholder_labels() {
        let _guard = LOCALE_LOCK.lock().unwrap();
        set_locale("fr");
        assert_eq!(t("lot.unknown"), "Inconnu");
        assert_eq!(t("shipment.agency_undefined"), "Agence non définie");

        set_locale("en");
        assert_eq!(t("shipment.courier_unassigned"), "Unassigned");
        set_locale("fr");
    }

    #[test]
    fn test_duplicate_packaging_message() {
        let _guard = LOCALE_LOCK.lock().unwrap();
        set_locale("fr");
        let msg = t_with_args(
            "packaging.duplicate",
            &[
                ("lots", "ML-001, ML-002"),
                ("kind", "Paquet"),
                ("subsidiary", "Mali"),
                ("date", "2026-03-02"),
            ],
        );
        assert_eq!(
            msg,
            "Le conditionnement du lot ML-001, ML-002 (Paquet) pour la filiale Mali à la date 2026-03-02 existe déjà"
        );
    }
}
