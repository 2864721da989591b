// [libs/domain/label-safety/src/lib.rs]
/*!
 * Filtro de seguridad de etiquetas (C1). Decide si una etiqueta propuesta
 * es apta para compra: longitud, posición de guiones, codificación
 * ASCII-LDH u homógrafo Unicode vía Punycode, invisibles y mezcla de
 * escrituras.
 *
 * Las etiquetas ASCII puramente numéricas (`"12345"`) se marcan inseguras
 * para evitar colisiones con IPs o con convenciones de subdominio numérico
 * que algunos registradores tratan de forma especial.
 */

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use unicode_script::{Script, UnicodeScript};

/// Codepoints invisibles que un atacante de homógrafos puede insertar para
/// partir visualmente una etiqueta sin alterar su lectura aparente.
const INVISIBLE_CODEPOINTS: [char; 5] = [
    '\u{200B}', // zero width space
    '\u{200C}', // zero width non-joiner
    '\u{200D}', // zero width joiner
    '\u{2060}', // word joiner
    '\u{FEFF}', // zero width no-break space / BOM
];

/// Escrituras reconocidas para el análisis de mezcla. Cualquier carácter
/// cuya escritura no esté en este conjunto (dígitos, guiones, Common,
/// Inherited) se ignora al contar escrituras distintas.
const RESTRICTED_SCRIPTS: [Script; 8] = [
    Script::Latin,
    Script::Cyrillic,
    Script::Greek,
    Script::Arabic,
    Script::Hebrew,
    Script::Han,
    Script::Hiragana,
    Script::Katakana,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    InvalidLength,
    InvalidHyphenPosition,
    NonAsciiNotAllowed,
    UnicodeMustUsePunycode,
    InvalidPunycode,
    HasInvisible,
    MixedScripts,
    AllNumeric,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelVerdict {
    pub safe: bool,
    pub reasons: Vec<Reason>,
}

impl LabelVerdict {
    fn unsafe_with(reason: Reason) -> Self {
        Self {
            safe: false,
            reasons: vec![reason],
        }
    }

    fn safe() -> Self {
        Self {
            safe: true,
            reasons: Vec::new(),
        }
    }
}

/// Clasifica una sola etiqueta (un segmento entre puntos, sin el TLD).
///
/// `allow_unicode` viene de configuración; cuando es `false` cualquier
/// etiqueta no-ASCII se rechaza sin intentar decodificar Punycode.
pub fn classify_label(label: &str, allow_unicode: bool) -> LabelVerdict {
    let lower = label.to_lowercase();

    let char_count = lower.chars().count();
    if char_count < 1 || char_count > 63 {
        return LabelVerdict::unsafe_with(Reason::InvalidLength);
    }
    if lower.starts_with('-') || lower.ends_with('-') {
        return LabelVerdict::unsafe_with(Reason::InvalidHyphenPosition);
    }

    let is_ascii_ldh = lower.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
    if is_ascii_ldh {
        if lower.chars().all(|c| c.is_ascii_digit()) {
            return LabelVerdict::unsafe_with(Reason::AllNumeric);
        }
        return LabelVerdict::safe();
    }

    if !allow_unicode {
        return LabelVerdict::unsafe_with(Reason::NonAsciiNotAllowed);
    }

    if !lower.starts_with("xn--") {
        return LabelVerdict::unsafe_with(Reason::UnicodeMustUsePunycode);
    }

    let decoded = match idna::punycode::decode_to_string(&lower[4..]) {
        Some(s) => s,
        None => return LabelVerdict::unsafe_with(Reason::InvalidPunycode),
    };

    let mut reasons = Vec::new();
    if decoded.chars().any(|c| INVISIBLE_CODEPOINTS.contains(&c)) {
        reasons.push(Reason::HasInvisible);
    }

    let scripts: HashSet<Script> = decoded
        .chars()
        .map(|c| c.script())
        .filter(|s| RESTRICTED_SCRIPTS.contains(s))
        .collect();
    if scripts.len() > 1 {
        reasons.push(Reason::MixedScripts);
    }

    LabelVerdict {
        safe: reasons.is_empty(),
        reasons,
    }
}

/// Clasifica una etiqueta de segundo nivel junto a su TLD (`"foo"`,
/// `"com"`). Solo el label se evalúa por homógrafos; el TLD se asume ya
/// validado contra la lista de permitidos en otra capa.
pub fn classify_domain_label(sld: &str, allow_unicode: bool) -> LabelVerdict {
    classify_label(sld, allow_unicode)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_ascii_label_is_safe() {
        let v = classify_label("example", true);
        assert!(v.safe);
        assert!(v.reasons.is_empty());
    }

    #[test]
    fn all_numeric_label_is_unsafe() {
        let v = classify_label("12345", true);
        assert!(!v.safe);
        assert_eq!(v.reasons, vec![Reason::AllNumeric]);
    }

    #[test]
    fn leading_hyphen_is_unsafe() {
        let v = classify_label("-example", true);
        assert_eq!(v.reasons, vec![Reason::InvalidHyphenPosition]);
    }

    #[test]
    fn trailing_hyphen_is_unsafe() {
        let v = classify_label("example-", true);
        assert_eq!(v.reasons, vec![Reason::InvalidHyphenPosition]);
    }

    #[test]
    fn empty_label_is_invalid_length() {
        let v = classify_label("", true);
        assert_eq!(v.reasons, vec![Reason::InvalidLength]);
    }

    #[test]
    fn label_over_63_chars_is_invalid_length() {
        let long = "a".repeat(64);
        let v = classify_label(&long, true);
        assert_eq!(v.reasons, vec![Reason::InvalidLength]);
    }

    #[test]
    fn unicode_without_punycode_prefix_rejected_when_allowed() {
        let v = classify_label("café", true);
        assert_eq!(v.reasons, vec![Reason::UnicodeMustUsePunycode]);
    }

    #[test]
    fn unicode_rejected_outright_when_disallowed() {
        let v = classify_label("café", false);
        assert_eq!(v.reasons, vec![Reason::NonAsciiNotAllowed]);
    }

    #[test]
    fn valid_punycode_single_script_is_safe() {
        // "café" -> xn--caf-dma
        let v = classify_label("xn--caf-dma", true);
        assert!(v.safe, "reasons: {:?}", v.reasons);
    }

    #[test]
    fn malformed_punycode_is_invalid_punycode() {
        let v = classify_label("xn--???", true);
        assert_eq!(v.reasons, vec![Reason::InvalidPunycode]);
    }

    #[test]
    fn mixed_script_homograph_is_flagged() {
        // Cyrillic 'а' (U+0430) mixed with Latin "pple" -> xn--pple-43d
        // encodes "аpple" (Cyrillic a + Latin pple).
        if let Some(encoded) = idna::punycode::encode_str("\u{0430}pple") {
            let label = format!("xn--{}", encoded);
            let v = classify_label(&label, true);
            assert!(v.reasons.contains(&Reason::MixedScripts), "reasons: {:?}", v.reasons);
        }
    }

    #[test]
    fn invisible_codepoint_is_flagged() {
        let raw = format!("go{}ogle", '\u{200B}');
        if let Some(encoded) = idna::punycode::encode_str(&raw) {
            let label = format!("xn--{}", encoded);
            let v = classify_label(&label, true);
            assert!(v.reasons.contains(&Reason::HasInvisible), "reasons: {:?}", v.reasons);
        }
    }
}
