use crate::RE_NON_DIGITS;

/// Pesos do primeiro dígito verificador do CNPJ.
const PESOS_CNPJ_DV1: [u32; 12] = [5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];

/// Pesos do segundo dígito verificador do CNPJ.
const PESOS_CNPJ_DV2: [u32; 13] = [6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];

/// Remove todos os caracteres que não sejam dígitos.
///
/// ```
/// use informe_rendimentos::somente_digitos;
///
/// assert_eq!(somente_digitos("111.444.777-35"), "11144477735");
/// assert_eq!(somente_digitos("00.621.930/0001-62"), "00621930000162");
/// ```
pub fn somente_digitos(texto: &str) -> String {
    RE_NON_DIGITS.replace_all(texto, "").into_owned()
}

/// Converte a string em vetor de dígitos.
///
/// Retorna `None` se houver qualquer caractere não numérico.
fn para_digitos(texto: &str) -> Option<Vec<u32>> {
    texto.chars().map(|c| c.to_digit(10)).collect()
}

/// Verifica se todos os dígitos são iguais (ex: 111.111.111-11).
fn digitos_repetidos(digitos: &[u32]) -> bool {
    digitos.windows(2).all(|par| par[0] == par[1])
}

/// Soma ponderada dos dígitos.
fn soma_ponderada(digitos: &[u32], pesos: impl IntoIterator<Item = u32>) -> u32 {
    digitos.iter().zip(pesos).map(|(d, p)| d * p).sum()
}

fn dv_cpf(digitos: &[u32]) -> u32 {
    // Pesos decrescentes: 10..2 para o DV1 e 11..2 para o DV2
    let peso_inicial = digitos.len() as u32 + 1;
    let soma = soma_ponderada(digitos, (2..=peso_inicial).rev());

    match (soma * 10) % 11 {
        10 | 11 => 0,
        resto => resto,
    }
}

fn dv_cnpj(digitos: &[u32], pesos: &[u32]) -> u32 {
    match soma_ponderada(digitos, pesos.iter().copied()) % 11 {
        resto if resto < 2 => 0,
        resto => 11 - resto,
    }
}

/// Calcula os dois dígitos verificadores de um CPF a partir dos 9 primeiros dígitos.
pub fn calcular_digitos_cpf(base: &[u32; 9]) -> [u32; 2] {
    let dv1 = dv_cpf(base);

    let mut com_dv1 = base.to_vec();
    com_dv1.push(dv1);

    [dv1, dv_cpf(&com_dv1)]
}

/// Calcula os dois dígitos verificadores de um CNPJ a partir dos 12 primeiros dígitos.
pub fn calcular_digitos_cnpj(base: &[u32; 12]) -> [u32; 2] {
    let dv1 = dv_cnpj(base, &PESOS_CNPJ_DV1);

    let mut com_dv1 = base.to_vec();
    com_dv1.push(dv1);

    [dv1, dv_cnpj(&com_dv1, &PESOS_CNPJ_DV2)]
}

/// Valida os dígitos verificadores de um CPF (11 dígitos, sem máscara).
pub fn validar_cpf(cpf: &str) -> bool {
    let Some(digitos) = para_digitos(cpf) else {
        return false;
    };

    if digitos.len() != 11 || digitos_repetidos(&digitos) {
        return false;
    }

    let dv1 = dv_cpf(&digitos[..9]);
    let dv2 = dv_cpf(&digitos[..10]);

    dv1 == digitos[9] && dv2 == digitos[10]
}

/// Valida os dígitos verificadores de um CNPJ (14 dígitos, sem máscara).
pub fn validar_cnpj(cnpj: &str) -> bool {
    let Some(digitos) = para_digitos(cnpj) else {
        return false;
    };

    if digitos.len() != 14 || digitos_repetidos(&digitos) {
        return false;
    }

    let dv1 = dv_cnpj(&digitos[..12], &PESOS_CNPJ_DV1);
    let dv2 = dv_cnpj(&digitos[..13], &PESOS_CNPJ_DV2);

    dv1 == digitos[12] && dv2 == digitos[13]
}

/// Valida um documento de CPF ou CNPJ de acordo com o número de dígitos.
///
/// A função é total: qualquer entrada que não tenha 11 ou 14 dígitos
/// (ou que contenha caracteres não numéricos) é inválida.
/// Use [`somente_digitos`] antes para remover a máscara.
///
/// ```
/// use informe_rendimentos::validar_documento;
///
/// assert!(validar_documento("11144477735"));
/// assert!(validar_documento("00621930000162"));
/// assert!(!validar_documento("11111111111"));
/// assert!(!validar_documento("111.444.777-35"));
/// ```
pub fn validar_documento(documento: &str) -> bool {
    match documento.len() {
        11 => validar_cpf(documento),
        14 => validar_cnpj(documento),
        _ => false,
    }
}

fn eh_numerico(texto: &str, tamanho: usize) -> bool {
    texto.len() == tamanho && texto.chars().all(|c| c.is_ascii_digit())
}

/// Aplica a máscara `###.###.###-##`; entradas que não tenham 11 dígitos são devolvidas sem alteração.
pub fn formatar_cpf(cpf: &str) -> String {
    if !eh_numerico(cpf, 11) {
        return cpf.to_string();
    }

    format!(
        "{}.{}.{}-{}",
        &cpf[0..3],
        &cpf[3..6],
        &cpf[6..9],
        &cpf[9..11]
    )
}

/// Aplica a máscara `##.###.###/####-##`; entradas que não tenham 14 dígitos são devolvidas sem alteração.
pub fn formatar_cnpj(cnpj: &str) -> String {
    if !eh_numerico(cnpj, 14) {
        return cnpj.to_string();
    }

    format!(
        "{}.{}.{}/{}-{}",
        &cnpj[0..2],
        &cnpj[2..5],
        &cnpj[5..8],
        &cnpj[8..12],
        &cnpj[12..14]
    )
}

/// Aplica a máscara de CPF (`###.###.###-##`) ou CNPJ (`##.###.###/####-##`).
///
/// Strings com outro tamanho (ou com caracteres não numéricos) são devolvidas sem alteração.
///
/// ```
/// use informe_rendimentos::formatar_documento;
///
/// assert_eq!(formatar_documento("11144477735"), "111.444.777-35");
/// assert_eq!(formatar_documento("00621930000162"), "00.621.930/0001-62");
/// assert_eq!(formatar_documento("12345"), "12345");
/// ```
pub fn formatar_documento(documento: &str) -> String {
    match documento.len() {
        11 => formatar_cpf(documento),
        14 => formatar_cnpj(documento),
        _ => documento.to_string(),
    }
}
