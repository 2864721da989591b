// [apps/gateway/src/dns_templates.rs]
/*!
 * Catálogo de plantillas de DNS aplicadas tras un registro exitoso
 * cuando `nameserver_mode` es `registrar`. `"web-basic"` es la
 * plantilla por defecto y la única obligatoria; nuevas plantillas se
 * añaden a `TEMPLATES` sin tocar la tubería de compra.
 */

use gatewayrs_infra_registrar::{DnsRecord, RecordType};

pub const DEFAULT_TEMPLATE_ID: &str = "web-basic";

/// Busca una plantilla por id. `None` si el id no existe en el
/// catálogo.
pub fn lookup(template_id: &str) -> Option<Vec<DnsRecord>> {
    match template_id {
        "web-basic" => Some(web_basic()),
        "parked" => Some(parked()),
        _ => None,
    }
}

fn web_basic() -> Vec<DnsRecord> {
    vec![
        DnsRecord {
            record_type: RecordType::A,
            name: "@".to_string(),
            value: "76.76.21.21".to_string(),
            ttl: 3600,
            prio: None,
        },
        DnsRecord {
            record_type: RecordType::Cname,
            name: "www".to_string(),
            value: "@".to_string(),
            ttl: 3600,
            prio: None,
        },
    ]
}

/// Plantilla mínima para dominios comprados sin sitio activo todavía:
/// un único registro de marcador apuntando a una página de retención.
fn parked() -> Vec<DnsRecord> {
    vec![DnsRecord {
        record_type: RecordType::A,
        name: "@".to_string(),
        value: "76.76.21.21".to_string(),
        ttl: 3600,
        prio: None,
    }]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_template_id_resolves() {
        assert!(lookup(DEFAULT_TEMPLATE_ID).is_some());
    }

    #[test]
    fn unknown_template_id_yields_none() {
        assert!(lookup("does-not-exist").is_none());
    }
}
