use crate::{Agregacao, Beneficiario, FontePagadora, NaturezaRendimento};

/// Dados de um comprovante individual, consumidos pelo renderizador de documentos.
#[derive(Debug, Clone, Copy)]
pub struct InformeIndividual<'a> {
    pub fonte: &'a FontePagadora,
    pub beneficiario: &'a Beneficiario,
    pub natureza: &'static NaturezaRendimento,
}

impl InformeIndividual<'_> {
    pub fn nome_do_arquivo(&self) -> String {
        format!(
            "Informe_{}_{}.pdf",
            self.beneficiario.documento(),
            self.beneficiario.nome()
        )
    }
}

/// Dados do informe consolidado com todos os beneficiários de uma importação.
#[derive(Debug, Clone, Copy)]
pub struct InformeConsolidado<'a> {
    pub fonte: &'a FontePagadora,
    pub beneficiarios: &'a [Beneficiario],
    pub natureza: &'static NaturezaRendimento,
}

impl<'a> InformeConsolidado<'a> {
    pub fn new(
        fonte: &'a FontePagadora,
        agregacao: &'a Agregacao,
        natureza: &'static NaturezaRendimento,
    ) -> Self {
        InformeConsolidado {
            fonte,
            beneficiarios: &agregacao.beneficiarios,
            natureza,
        }
    }

    /// Um comprovante por beneficiário, na ordem da importação.
    pub fn individuais(&self) -> impl Iterator<Item = InformeIndividual<'a>> + use<'a> {
        let (fonte, natureza, beneficiarios) = (self.fonte, self.natureza, self.beneficiarios);

        beneficiarios
            .iter()
            .map(move |beneficiario| InformeIndividual {
                fonte,
                beneficiario,
                natureza,
            })
    }

    pub fn total_rendimentos(&self) -> f64 {
        self.beneficiarios
            .iter()
            .map(Beneficiario::total_rendimentos)
            .sum()
    }

    pub fn total_irrf(&self) -> f64 {
        self.beneficiarios.iter().map(Beneficiario::total_irrf).sum()
    }

    pub fn nome_do_arquivo(&self) -> String {
        format!("Informes_Consolidados_{}.pdf", self.fonte.cnpj())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Celula, agregar_beneficiarios, buscar_natureza};

    #[test]
    fn consolidado_e_individuais() {
        let fonte =
            FontePagadora::new("11222333000181", Some("EMPRESA"), "Fulano", "2026", "2025").unwrap();
        let linhas = vec![
            ["", "", "", "ANA", "11144477735", "01/2025", "100", "10"]
                .map(Celula::from)
                .to_vec(),
            ["", "", "", "BIA", "52998224725", "03/2025", "200", "20"]
                .map(Celula::from)
                .to_vec(),
        ];
        let agregacao = agregar_beneficiarios(&linhas);
        let consolidado = InformeConsolidado::new(&fonte, &agregacao, buscar_natureza("13002"));

        assert_eq!(consolidado.total_rendimentos(), 300.0);
        assert_eq!(consolidado.total_irrf(), 30.0);
        assert_eq!(
            consolidado.nome_do_arquivo(),
            "Informes_Consolidados_11222333000181.pdf"
        );

        let arquivos: Vec<String> = consolidado
            .individuais()
            .map(|informe| informe.nome_do_arquivo())
            .collect();
        assert_eq!(
            arquivos,
            vec!["Informe_11144477735_ANA.pdf", "Informe_52998224725_BIA.pdf"]
        );
    }
}
