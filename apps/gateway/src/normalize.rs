// [apps/gateway/src/normalize.rs]
/*!
 * Normalización sintáctica de nombres de dominio, compartida por las
 * tres rutas que reciben uno (`/buy`, `/search`, `/status/:domain`).
 * La forma canónica es siempre minúsculas, sin espacios en los
 * bordes, conforme a la forma mínima de un FQDN: labels no vacíos
 * separados por puntos y un TLD alfabético.
 *
 * Esto no exige ASCII en los labels. Esa decisión -- ASCII-LDH plano,
 * homógrafo Unicode vía Punycode, o rechazo -- le corresponde al
 * filtro de seguridad de etiquetas (C1), que corre después y necesita
 * ver el candidato completo, ASCII o no, para poder emitir sus
 * propios motivos de rechazo.
 */

use once_cell::sync::Lazy;
use regex::Regex;

static STRUCTURE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^.\s]+(\.[^.\s]+)*\.[a-zA-Z]{2,}$").expect("static regex is valid"));

/// Normaliza a minúsculas y recorta espacios; valida longitud (3..253)
/// y la forma `label(.label)*.tld`. No impone ASCII-LDH en los labels.
pub fn normalize_domain(raw: &str) -> Result<String, String> {
    let trimmed = raw.trim().to_lowercase();
    if trimmed.len() < 3 || trimmed.len() > 253 {
        return Err(format!("domain length must be 3..253, got {}", trimmed.len()));
    }
    if !STRUCTURE_PATTERN.is_match(&trimmed) {
        return Err(format!("'{trimmed}' does not match the domain name grammar"));
    }
    Ok(trimmed)
}

/// Separa un dominio normalizado en `(sld, tld)`. El SLD es todo lo que
/// precede al último punto; el TLD es el último label.
pub fn split_label_tld(domain: &str) -> (&str, &str) {
    domain.rsplit_once('.').expect("normalize_domain already guaranteed a dot")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_domain() {
        assert_eq!(normalize_domain("Example.COM").unwrap(), "example.com");
    }

    #[test]
    fn rejects_missing_tld() {
        assert!(normalize_domain("localhost").is_err());
    }

    #[test]
    fn leading_hyphen_is_structurally_accepted() {
        // Hyphen placement is C1's job, not the structural grammar's.
        assert!(normalize_domain("-example.com").is_ok());
    }

    #[test]
    fn non_ascii_label_is_structurally_accepted() {
        // Non-ASCII rejection is C1's job; the structural grammar only
        // cares about dot-separated labels and an alphabetic TLD.
        assert_eq!(normalize_domain("аpple.com").unwrap(), "аpple.com");
    }

    #[test]
    fn splits_label_and_tld() {
        assert_eq!(split_label_tld("example.com"), ("example", "com"));
    }
}
