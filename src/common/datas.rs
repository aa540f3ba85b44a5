// src/common/datas.rs
//
// Conversões entre o formato brasileiro (dd/mm/aaaa) usado na tela e o ISO
// (aaaa-mm-dd) usado no payload.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;

static DATA_BR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{2})/(\d{2})/(\d{4})$").expect("regex DATA_BR"));
static DATA_ISO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})-(\d{2})-(\d{2})").expect("regex DATA_ISO"));
static DATA_HORA_ISO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4})-(\d{2})-(\d{2})(?:[T\s])?(\d{2}):(\d{2})").expect("regex DATA_HORA_ISO")
});

/// "31/01/2024" -> 2024-01-31. Datas inexistentes (32/01, 30/02) são rejeitadas.
pub fn parse_data_br(valor: &str) -> Option<NaiveDate> {
    let caps = DATA_BR.captures(valor.trim())?;
    let dia: u32 = caps[1].parse().ok()?;
    let mes: u32 = caps[2].parse().ok()?;
    let ano: i32 = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(ano, mes, dia)
}

/// Aceita tanto dd/mm/aaaa quanto um valor que já começa em ISO.
/// Retorna a data em ISO ("2024-01-31") ou `None` se não reconhecer.
pub fn data_br_para_iso(valor: &str) -> Option<String> {
    let valor = valor.trim();
    if valor.is_empty() {
        return None;
    }
    if DATA_BR.is_match(valor) {
        return parse_data_br(valor).map(|d| d.format("%Y-%m-%d").to_string());
    }
    parse_data(valor).map(|d| d.format("%Y-%m-%d").to_string())
}

/// Data ISO (com ou sem hora depois). Usa só os 10 primeiros caracteres.
pub fn parse_data(valor: &str) -> Option<NaiveDate> {
    let caps = DATA_ISO.captures(valor.trim())?;
    let ano: i32 = caps[1].parse().ok()?;
    let mes: u32 = caps[2].parse().ok()?;
    let dia: u32 = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(ano, mes, dia)
}

/// Data/hora ISO 8601: "2024-01-31T08:30", "2024-01-31T08:30:00",
/// "2024-01-31 08:30" ou com fuso ("...-03:00", considerado horário local).
pub fn parse_data_hora(valor: &str) -> Option<NaiveDateTime> {
    let valor = valor.trim();
    if valor.is_empty() {
        return None;
    }
    const FORMATOS: [&str; 6] = [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
    ];
    FORMATOS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(valor, fmt).ok())
        .or_else(|| DateTime::parse_from_rfc3339(valor).ok().map(|dt| dt.naive_local()))
}

/// "31/01/2024 08:30" (com ou sem segundos) -> "2024-01-31T08:30".
pub fn parse_data_hora_br(valor: &str) -> Option<String> {
    let valor = valor.trim();
    ["%d/%m/%Y %H:%M:%S", "%d/%m/%Y %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(valor, fmt).ok())
        .map(|dt| dt.format("%Y-%m-%dT%H:%M").to_string())
}

/// Valores vindos de um input datetime-local têm 16 caracteres; o backend
/// espera segundos.
pub fn normalizar_data_hora(valor: &str) -> String {
    if valor.len() == 16 {
        format!("{valor}:00")
    } else {
        valor.to_string()
    }
}

/// "2024-01-31" -> "31/01/2024". Valores fora do padrão voltam como vieram.
pub fn formatar_data_br(valor: &str) -> String {
    match DATA_ISO.captures(valor) {
        Some(c) => format!("{}/{}/{}", &c[3], &c[2], &c[1]),
        None => valor.to_string(),
    }
}

/// "2024-01-31T08:30:00" -> "31/01/2024 08:30".
pub fn formatar_data_hora_br(valor: &str) -> String {
    match DATA_HORA_ISO.captures(valor) {
        Some(c) => format!("{}/{}/{} {}:{}", &c[3], &c[2], &c[1], &c[4], &c[5]),
        None => formatar_data_br(valor),
    }
}

/// Igual a `formatar_data_hora_br`, mas vazio quando a data não é válida.
pub fn formatar_data_hora_opt(valor: Option<&str>) -> String {
    valor
        .and_then(parse_data_hora)
        .map(|dt| dt.format("%d/%m/%Y %H:%M").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_br_valida_vira_iso() {
        assert_eq!(data_br_para_iso("31/01/2024").as_deref(), Some("2024-01-31"));
        assert_eq!(data_br_para_iso("2024-01-31").as_deref(), Some("2024-01-31"));
    }

    #[test]
    fn data_br_invalida_e_rejeitada() {
        assert_eq!(data_br_para_iso("32/01/2024"), None);
        assert_eq!(data_br_para_iso("30/02/2024"), None);
        assert_eq!(data_br_para_iso("1/1/2024"), None);
        assert_eq!(data_br_para_iso(""), None);
    }

    #[test]
    fn formata_datas_para_exibicao() {
        assert_eq!(formatar_data_br("2024-01-31"), "31/01/2024");
        assert_eq!(formatar_data_hora_br("2024-01-31T08:05:00"), "31/01/2024 08:05");
        assert_eq!(formatar_data_br("texto"), "texto");
        assert_eq!(formatar_data_hora_opt(Some("lixo")), "");
        assert_eq!(formatar_data_hora_opt(None), "");
    }

    #[test]
    fn aceita_varios_formatos_de_data_hora() {
        let esperado = NaiveDate::from_ymd_opt(2024, 1, 31)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap();
        for v in [
            "2024-01-31T08:30",
            "2024-01-31T08:30:00",
            "2024-01-31 08:30",
            "2024-01-31T08:30:00-03:00",
        ] {
            assert_eq!(parse_data_hora(v), Some(esperado), "{v}");
        }
        assert_eq!(parse_data_hora("31/01/2024 08:30"), None);
    }

    #[test]
    fn converte_data_hora_br() {
        assert_eq!(parse_data_hora_br("05/03/2024 14:10").as_deref(), Some("2024-03-05T14:10"));
        assert_eq!(parse_data_hora_br("05/03/2024 14:10:59").as_deref(), Some("2024-03-05T14:10"));
        assert_eq!(parse_data_hora_br("05/03/2024"), None);
    }

    #[test]
    fn normaliza_segundos() {
        assert_eq!(normalizar_data_hora("2024-01-31T08:30"), "2024-01-31T08:30:00");
        assert_eq!(normalizar_data_hora("2024-01-31T08:30:00"), "2024-01-31T08:30:00");
        assert_eq!(normalizar_data_hora(""), "");
    }
}
