use chrono::{DateTime, Datelike};

use crate::Celula;

/// Dias entre a época das planilhas (1899-12-30) e a época Unix (1970-01-01).
pub const DIAS_EPOCA_PLANILHA: f64 = 25569.0;

const MILISSEGUNDOS_POR_DIA: f64 = 86_400.0 * 1000.0;

/// Mês de competência resolvido a partir da coluna de apuração.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Periodo {
    /// Índice do mês: 0 = janeiro, 11 = dezembro.
    pub mes: usize,
    /// `false` quando o valor não pôde ser interpretado e o mês padrão (janeiro) foi usado.
    pub exato: bool,
}

impl Periodo {
    const PADRAO: Periodo = Periodo {
        mes: 0,
        exato: false,
    };

    fn from_mes(mes: Option<i64>) -> Self {
        match mes {
            Some(mes @ 0..=11) => Periodo {
                mes: mes as usize,
                exato: true,
            },
            _ => Periodo::PADRAO,
        }
    }
}

/// Converte uma data serial de planilha no mês UTC (0-indexado).
pub fn mes_da_data_serial(serial: f64) -> Option<i64> {
    let milissegundos = ((serial - DIAS_EPOCA_PLANILHA) * MILISSEGUNDOS_POR_DIA).round();

    if !milissegundos.is_finite() {
        return None;
    }

    DateTime::from_timestamp_millis(milissegundos as i64).map(|data| data.month0() as i64)
}

/// Interpreta os dígitos iniciais de um token (`"02"`, `" 3 "`, `"04abc"`).
fn inteiro_inicial(token: &str) -> Option<i64> {
    let token = token.trim();
    let fim = token
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(token.len());

    token[..fim].parse().ok()
}

/// Extrai o mês (0-indexado) de um texto delimitado por `/`.
///
/// - `DD/MM/AAAA` (três ou mais partes): o mês é a segunda parte.
/// - `MM/AAAA` (duas partes): o mês é a primeira parte.
/// - `DD/MM` (duas partes, a primeira maior que 12): o mês é a segunda parte.
pub fn mes_do_texto(texto: &str) -> Option<i64> {
    let partes: Vec<&str> = texto.split('/').collect();

    let mes = match partes.as_slice() {
        [] | [_] => return None,
        [primeira, segunda] => {
            let primeira = inteiro_inicial(primeira)?;
            match inteiro_inicial(segunda) {
                Some(segunda) if primeira > 12 && (1..=12).contains(&segunda) => segunda,
                _ => primeira,
            }
        }
        [_, segunda, ..] => inteiro_inicial(segunda)?,
    };

    Some(mes - 1)
}

/// Resolve o mês de competência de uma célula da coluna de apuração.
///
/// Nunca falha: valores vazios, malformados ou fora do intervalo resultam em janeiro
/// com `exato == false`.
///
/// ```
/// use informe_rendimentos::{Celula, resolver_periodo};
///
/// // 45292 = 2024-01-01, 45323 = 2024-02-01
/// assert_eq!(resolver_periodo(&Celula::Numero(45292.0)).mes, 0);
/// assert_eq!(resolver_periodo(&Celula::Numero(45323.0)).mes, 1);
/// assert_eq!(resolver_periodo(&Celula::from("15/03/2025")).mes, 2);
/// assert_eq!(resolver_periodo(&Celula::from("02/2025")).mes, 1);
/// assert!(!resolver_periodo(&Celula::Vazia).exato);
/// ```
pub fn resolver_periodo(celula: &Celula) -> Periodo {
    let mes = match celula {
        Celula::Numero(serial) => mes_da_data_serial(*serial),
        Celula::Texto(texto) => mes_do_texto(texto),
        Celula::Vazia => None,
    };

    Periodo::from_mes(mes)
}

/// Atalho para [`resolver_periodo`] retornando apenas o índice do mês.
pub fn resolver_mes(celula: &Celula) -> usize {
    resolver_periodo(celula).mes
}
