// src/services/cpf.rs

/// Sequências que passam no cálculo dos dígitos mas não são CPFs emitidos.
const BLACKLIST: [&str; 11] = [
    "12345678909",
    "01234567890",
    "11111111111",
    "22222222222",
    "33333333333",
    "44444444444",
    "55555555555",
    "66666666666",
    "77777777777",
    "88888888888",
    "99999999999",
];

pub fn only_digits(valor: &str) -> String {
    valor.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Valida o CPF pelos dois dígitos verificadores (módulo 11).
/// Pontuação é ignorada: "529.982.247-25" é aceito.
pub fn is_cpf(valor: &str) -> bool {
    let cpf = only_digits(valor);
    if cpf.len() != 11 {
        return false;
    }
    let digitos: Vec<u32> = cpf.chars().filter_map(|c| c.to_digit(10)).collect();

    if digitos.iter().all(|d| *d == digitos[0]) {
        return false;
    }
    if BLACKLIST.contains(&cpf.as_str()) {
        return false;
    }

    digito_verificador(&digitos[..9]) == digitos[9] && digito_verificador(&digitos[..10]) == digitos[10]
}

fn digito_verificador(base: &[u32]) -> u32 {
    let peso_inicial = base.len() as u32 + 1;
    let soma: u32 = base
        .iter()
        .enumerate()
        .map(|(i, d)| d * (peso_inicial - i as u32))
        .sum();
    match (soma * 10) % 11 {
        10 => 0,
        d => d,
    }
}

/// "52998224725" -> "529***25". Usado no resumo do assistente.
pub fn mascarar(cpf: &str) -> String {
    if cpf.len() == 11 && cpf.is_ascii() {
        format!("{}***{}", &cpf[..3], &cpf[9..])
    } else {
        "—".to_string()
    }
}
