use chrono::NaiveDate;

use crate::{
    FontePagadora, InformeError, InformeResult, NaturezaRendimento, RE_PERIODO_DARF,
    formatar_cnpj,
};

/// Dados de preenchimento do Documento de Arrecadação de Receitas Federais.
#[derive(Debug, Clone, PartialEq)]
pub struct Darf {
    pub razao_social: String,
    /// CNPJ da fonte pagadora (somente dígitos).
    pub cnpj: String,
    pub natureza: &'static NaturezaRendimento,
    pub codigo_receita: &'static str,
    /// Período de apuração no formato `MM/AAAA`.
    pub periodo_apuracao: String,
    pub data_vencimento: NaiveDate,
    pub valor_principal: f64,
    pub multa: f64,
    pub juros: f64,
}

fn verificar_valor(campo: &'static str, valor: f64) -> InformeResult<f64> {
    if valor.is_finite() && valor >= 0.0 {
        Ok(valor)
    } else {
        Err(InformeError::ValorNegativo { campo, valor })
    }
}

impl Darf {
    /// Monta o DARF do IRRF retido.
    ///
    /// O valor principal normalmente é o total de IRRF da importação
    /// ([`crate::Agregacao::total_irrf`]).
    ///
    /// ```
    /// use informe_rendimentos::{Darf, FontePagadora, buscar_natureza};
    ///
    /// let fonte = FontePagadora::new("00.621.930/0001-62", None, "Fulano", "2026", "2025").unwrap();
    /// let darf = Darf::gerar(&fonte, buscar_natureza("13002"), "01/2025", "20/02/2025", 300.0, 6.0, 1.5).unwrap();
    ///
    /// assert_eq!(darf.codigo_receita, "3208");
    /// assert_eq!(darf.numero_referencia(), "012025");
    /// assert_eq!(darf.valor_total(), 307.5);
    /// ```
    pub fn gerar(
        fonte: &FontePagadora,
        natureza: &'static NaturezaRendimento,
        periodo_apuracao: &str,
        data_vencimento: &str,
        valor_principal: f64,
        multa: f64,
        juros: f64,
    ) -> InformeResult<Self> {
        let codigo_receita = natureza
            .codigo_receita
            .ok_or(InformeError::NaturezaIsenta {
                codigo: natureza.codigo,
                descricao: natureza.descricao,
            })?;

        let periodo_apuracao = periodo_apuracao.trim();
        let mes_valido = RE_PERIODO_DARF
            .captures(periodo_apuracao)
            .and_then(|caps| caps[1].parse::<u32>().ok())
            .is_some_and(|mes| (1..=12).contains(&mes));

        if !mes_valido {
            return Err(InformeError::PeriodoDarfInvalido(
                periodo_apuracao.to_string(),
            ));
        }

        let data_vencimento = NaiveDate::parse_from_str(data_vencimento.trim(), "%d/%m/%Y")
            .map_err(|_| InformeError::VencimentoInvalido(data_vencimento.to_string()))?;

        Ok(Darf {
            razao_social: fonte.razao_social().to_string(),
            cnpj: fonte.cnpj().to_string(),
            natureza,
            codigo_receita,
            periodo_apuracao: periodo_apuracao.to_string(),
            data_vencimento,
            valor_principal: verificar_valor("o valor principal", valor_principal)?,
            multa: verificar_valor("a multa", multa)?,
            juros: verificar_valor("os juros", juros)?,
        })
    }

    pub fn valor_total(&self) -> f64 {
        self.valor_principal + self.multa + self.juros
    }

    /// Número de referência: o período de apuração sem a barra (`01/2025` -> `012025`).
    pub fn numero_referencia(&self) -> String {
        self.periodo_apuracao.replace('/', "")
    }

    pub fn cnpj_formatado(&self) -> String {
        formatar_cnpj(&self.cnpj)
    }

    pub fn vencimento_formatado(&self) -> String {
        self.data_vencimento.format("%d/%m/%Y").to_string()
    }

    /// Nome sugerido para o documento gerado pelo renderizador.
    pub fn nome_do_arquivo(&self) -> String {
        format!("DARF_{}_{}.pdf", self.cnpj, self.numero_referencia())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buscar_natureza;

    fn fonte() -> FontePagadora {
        FontePagadora::new("11222333000181", Some("EMPRESA TESTE LTDA"), "Fulano", "2026", "2025")
            .unwrap()
    }

    #[test]
    fn campos_do_darf() {
        let darf = Darf::gerar(
            &fonte(),
            buscar_natureza("12016"),
            "12/2025",
            "20/01/2026",
            1000.0,
            0.0,
            0.0,
        )
        .unwrap();

        assert_eq!(darf.codigo_receita, "5706");
        assert_eq!(darf.cnpj_formatado(), "11.222.333/0001-81");
        assert_eq!(darf.vencimento_formatado(), "20/01/2026");
        assert_eq!(darf.numero_referencia(), "122025");
        assert_eq!(darf.nome_do_arquivo(), "DARF_11222333000181_122025.pdf");
        assert_eq!(darf.valor_total(), 1000.0);
        assert_eq!(darf.razao_social, "EMPRESA TESTE LTDA");
    }

    #[test]
    fn natureza_isenta_nao_gera_darf() {
        let resultado = Darf::gerar(
            &fonte(),
            buscar_natureza("12001"),
            "01/2025",
            "20/02/2025",
            0.0,
            0.0,
            0.0,
        );
        assert!(matches!(
            resultado,
            Err(InformeError::NaturezaIsenta { codigo: "12001", .. })
        ));
    }

    #[test]
    fn periodo_invalido() {
        for periodo in ["13/2025", "00/2025", "1/2025", "2025-01", ""] {
            let resultado = Darf::gerar(
                &fonte(),
                buscar_natureza("10001"),
                periodo,
                "20/02/2025",
                1.0,
                0.0,
                0.0,
            );
            assert!(
                matches!(resultado, Err(InformeError::PeriodoDarfInvalido(_))),
                "período: {periodo:?}"
            );
        }
    }

    #[test]
    fn vencimento_invalido() {
        let resultado = Darf::gerar(
            &fonte(),
            buscar_natureza("10001"),
            "01/2025",
            "31/02/2025",
            1.0,
            0.0,
            0.0,
        );
        assert!(matches!(resultado, Err(InformeError::VencimentoInvalido(_))));
    }

    #[test]
    fn valores_negativos() {
        let resultado = Darf::gerar(
            &fonte(),
            buscar_natureza("10001"),
            "01/2025",
            "20/02/2025",
            1.0,
            -2.0,
            0.0,
        );
        assert!(matches!(
            resultado,
            Err(InformeError::ValorNegativo { campo: "a multa", .. })
        ));
    }
}
