use std::{
    fs::File,
    io::BufWriter,
    path::Path,
    process::Command,
};

use crate::{
    Agregacao, Beneficiario, Darf, FontePagadora, InformeConsolidado, InformeResult,
    NOMES_DOS_MESES, NaturezaRendimento,
};

/// Limpar a tela.
pub fn clear_screen(clear_screen: bool) -> InformeResult<()> {
    if clear_screen {
        if cfg!(target_os = "windows") {
            // No Windows, 'cls' é um comando interno do 'cmd'.
            Command::new("cmd").args(["/c", "cls"]).status()?;
        } else {
            Command::new("clear").status()?;
        }
    }

    Ok(())
}

/// Exibe a descrição e a versão do programa.
pub fn imprimir_versao_do_programa() {
    let descr = [
        "Este programa gera os dados dos Informes de Rendimentos e do DARF a partir de planilhas de pagamentos.",
        "Cada linha da planilha contém o beneficiário, o CPF/CNPJ, o período de apuração, o rendimento bruto e o IRRF.",
        "As linhas de um mesmo beneficiário (identificado pelo nome) são somadas mês a mês.",
        "Os dígitos verificadores de CPF e CNPJ são conferidos e os documentos inválidos são destacados.",
        "Linhas malformadas não interrompem a importação: são descartadas ou recebem valores padrão.",
    ];

    for line in &descr {
        println!(" {}", line);
    }

    println!("\n versão: {}\n", env!("CARGO_PKG_VERSION"));
}

/// Agrupa os dígitos de um número inteiro em milhares (`"1234567"` -> `"1.234.567"`).
fn agrupar_milhares(digitos: &str) -> String {
    let len = digitos.len();
    let mut result = String::with_capacity(len + len / 3);

    digitos.chars().enumerate().for_each(|(i, c)| {
        // Adiciona o ponto se:
        // 1. Não for o primeiro caractere (i > 0)
        // 2. A distância até o fim for múltipla de 3
        if i > 0 && (len - i).is_multiple_of(3) {
            result.push('.');
        }
        result.push(c);
    });

    result
}

pub fn fmt_milhares(n: usize) -> String {
    agrupar_milhares(&n.to_string())
}

/// Formata o valor como moeda brasileira com duas casas decimais.
///
/// ```
/// use informe_rendimentos::formatar_moeda;
///
/// assert_eq!(formatar_moeda(1234.56), "R$ 1.234,56");
/// assert_eq!(formatar_moeda(0.0), "R$ 0,00");
/// assert_eq!(formatar_moeda(-1000000.0), "-R$ 1.000.000,00");
/// ```
pub fn formatar_moeda(valor: f64) -> String {
    let texto = format!("{:.2}", valor.abs());
    let (inteiro, decimal) = texto.split_once('.').unwrap_or((texto.as_str(), "00"));

    // Valores que arredondam para zero não recebem sinal
    let sinal = if valor < 0.0 && texto != "0.00" { "-" } else { "" };

    format!("{sinal}R$ {},{decimal}", agrupar_milhares(inteiro))
}

/// Valor com vírgula decimal e sem separador de milhar, para exportação CSV.
pub fn formatar_decimal(valor: f64) -> String {
    format!("{:.2}", valor).replace('.', ",")
}

fn status_documento(beneficiario: &Beneficiario) -> &'static str {
    if beneficiario.documento_valido() {
        "válido"
    } else {
        "INVÁLIDO"
    }
}

/// Imprime a fonte pagadora, a natureza e o resumo por beneficiário.
pub fn imprimir_resumo(
    fonte: &FontePagadora,
    natureza: &NaturezaRendimento,
    agregacao: &Agregacao,
    nome: &str,
) {
    println!(" --- Informe de Rendimentos: {} ---", nome);
    println!(
        " Fonte pagadora: {} - {}",
        fonte.cnpj_formatado(),
        fonte.razao_social()
    );
    println!(" Responsável: {}", fonte.responsavel());
    println!(
        " Exercício: {}  Ano-calendário: {}",
        fonte.exercicio(),
        fonte.ano_calendario()
    );
    println!(
        " Natureza do rendimento: {} - {} ({})\n",
        natureza.codigo, natureza.descricao, natureza.grupo
    );

    println!(
        " Linhas de dados: {}  Linhas ignoradas (cabeçalho/em branco): {}",
        fmt_milhares(agregacao.linhas_de_dados),
        fmt_milhares(agregacao.linhas_ignoradas)
    );
    println!(
        " Beneficiários encontrados: {}\n",
        fmt_milhares(agregacao.beneficiarios.len())
    );

    let max_len = agregacao
        .beneficiarios
        .iter()
        .map(|b| b.nome().chars().count())
        .max()
        .unwrap_or_default();

    for beneficiario in &agregacao.beneficiarios {
        println!(
            " {:<18} {:<8} {:<max_len$} rendimentos = {:>18}  IRRF = {:>16}",
            beneficiario.documento_formatado(),
            status_documento(beneficiario),
            beneficiario.nome(),
            formatar_moeda(beneficiario.total_rendimentos()),
            formatar_moeda(beneficiario.total_irrf()),
        );
    }

    println!(
        "\n Total de rendimentos: {}\n Total de IRRF: {}\n",
        formatar_moeda(agregacao.total_rendimentos()),
        formatar_moeda(agregacao.total_irrf())
    );

    let invalidos: Vec<&Beneficiario> = agregacao.documentos_invalidos().collect();

    if !invalidos.is_empty() {
        println!(
            " Atenção: {} beneficiário(s) com CPF/CNPJ inválido:",
            fmt_milhares(invalidos.len())
        );
        for beneficiario in invalidos {
            println!(
                "  -> {} ({})",
                beneficiario.nome(),
                beneficiario.documento_formatado()
            );
        }
        println!();
    }
}

/// Imprime os valores mês a mês de cada beneficiário.
pub fn imprimir_detalhamento_mensal(agregacao: &Agregacao) {
    for beneficiario in &agregacao.beneficiarios {
        println!(
            " {} ({})",
            beneficiario.nome(),
            beneficiario.documento_formatado()
        );

        for (mes, nome_mes) in NOMES_DOS_MESES.iter().enumerate() {
            let bruto = beneficiario.rendimentos()[mes];
            let irrf = beneficiario.irrf()[mes];

            if bruto != 0.0 || irrf != 0.0 {
                println!(
                    "   {} {:>18} {:>16}",
                    nome_mes,
                    formatar_moeda(bruto),
                    formatar_moeda(irrf)
                );
            }
        }
        println!();
    }
}

pub fn imprimir_diagnosticos(agregacao: &Agregacao) {
    if agregacao.diagnosticos.is_empty() {
        return;
    }

    println!(
        " Ocorrências na importação ({}):",
        fmt_milhares(agregacao.diagnosticos.len())
    );
    for diagnostico in &agregacao.diagnosticos {
        println!("  - {}", diagnostico);
    }
    println!();
}

pub fn imprimir_darf(darf: &Darf) {
    println!(" --- DARF ---");
    println!(" 01 Nome: {}", darf.razao_social);
    println!(" 02 Período de apuração: {}", darf.periodo_apuracao);
    println!(" 03 CNPJ: {}", darf.cnpj_formatado());
    println!(" 04 Código da receita: {}", darf.codigo_receita);
    println!(" 05 Número de referência: {}", darf.numero_referencia());
    println!(" 06 Data de vencimento: {}", darf.vencimento_formatado());
    println!(" 07 Valor do principal: {:>18}", formatar_moeda(darf.valor_principal));
    println!(" 08 Valor da multa: {:>22}", formatar_moeda(darf.multa));
    println!(" 09 Valor dos juros: {:>21}", formatar_moeda(darf.juros));
    println!(" 10 Valor total: {:>25}", formatar_moeda(darf.valor_total()));
    println!(
        " Natureza: {} - {}\n",
        darf.natureza.codigo, darf.natureza.descricao
    );
}

/// Lista os documentos que o renderizador deve produzir para a importação.
pub fn imprimir_documentos(consolidado: &InformeConsolidado) {
    println!(" Documentos a gerar:");
    println!("  {}", consolidado.nome_do_arquivo());
    for informe in consolidado.individuais() {
        println!("  {}", informe.nome_do_arquivo());
    }
    println!();
}

/// Exporta as fichas dos beneficiários em CSV delimitado por `;`.
///
/// Colunas: documento, nome, situação do documento, rendimentos de janeiro a dezembro,
/// IRRF de janeiro a dezembro e os dois totais.
pub fn exportar_beneficiarios(agregacao: &Agregacao, path: &Path) -> InformeResult<()> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_writer(BufWriter::new(file));

    let mut cabecalho = vec![
        "CPF/CNPJ".to_string(),
        "Nome".to_string(),
        "Documento Válido".to_string(),
    ];
    cabecalho.extend(NOMES_DOS_MESES.iter().map(|m| format!("Rendimentos {m}")));
    cabecalho.extend(NOMES_DOS_MESES.iter().map(|m| format!("IRRF {m}")));
    cabecalho.push("Total Rendimentos".to_string());
    cabecalho.push("Total IRRF".to_string());

    wtr.write_record(&cabecalho)?;

    for beneficiario in &agregacao.beneficiarios {
        let mut registro = vec![
            beneficiario.documento_formatado(),
            beneficiario.nome().to_string(),
            if beneficiario.documento_valido() {
                "Sim".to_string()
            } else {
                "Não".to_string()
            },
        ];
        registro.extend(beneficiario.rendimentos().iter().map(|v| formatar_decimal(*v)));
        registro.extend(beneficiario.irrf().iter().map(|v| formatar_decimal(*v)));
        registro.push(formatar_decimal(beneficiario.total_rendimentos()));
        registro.push(formatar_decimal(beneficiario.total_irrf()));

        wtr.write_record(&registro)?;
    }

    // O flush garante que os dados saiam do buffer para o disco antes de fechar.
    wtr.flush()?;

    Ok(())
}
