//! The `quizetl init` command.

use std::path::Path;

use anyhow::Result;

pub fn execute() -> Result<()> {
    if Path::new("quizetl.toml").exists() {
        println!("quizetl.toml already exists, skipping.");
    } else {
        std::fs::write("quizetl.toml", SAMPLE_CONFIG)?;
        println!("Created quizetl.toml");
    }

    std::fs::create_dir_all("config")?;
    let bank_path = Path::new("config/perguntas.json");
    if bank_path.exists() {
        println!("config/perguntas.json already exists, skipping.");
    } else {
        std::fs::write(bank_path, EXAMPLE_QUESTION_BANK)?;
        println!("Created config/perguntas.json");
    }

    println!("\nNext steps:");
    println!("  1. Edit config/perguntas.json with your questions");
    println!("  2. Run: quizetl validate");
    println!("  3. Run: quizetl answer --aluno \"Maria\" --bloco \"Bloco 1\" --answers b1q1=A,b1q2=B");
    println!("  4. Run: quizetl etl && quizetl results");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# quizetl configuration

questions = "config/perguntas.json"
raw_csv = "data/raw/respostas_raw.csv"
curated_csv = "data/curated/respostas_curadas.csv"
reports_dir = "data/reports"
default_turma = "Turma A"
"#;

const EXAMPLE_QUESTION_BANK: &str = r#"{
  "Bloco 1": [
    {
      "id": "b1q1",
      "pergunta": "O que significa a letra E em ETL?",
      "opcoes": {
        "A": "Extract (extrair)",
        "B": "Export (exportar)",
        "C": "Evaluate (avaliar)"
      },
      "gabarito": "A",
      "explicacao": "ETL = Extract, Transform, Load: extrair, transformar e carregar."
    },
    {
      "id": "b1q2",
      "pergunta": "Onde as respostas ficam gravadas antes do ETL?",
      "opcoes": {
        "A": "Na base tratada",
        "B": "Na base bruta (raw)",
        "C": "No painel de resultados"
      },
      "gabarito": "B",
      "explicacao": "A base bruta recebe tudo; o ETL consolida depois."
    }
  ],
  "Bloco 2": [
    {
      "id": "b2q1",
      "pergunta": "Se um aluno responde a mesma questão duas vezes, qual resposta a base tratada mantém?",
      "opcoes": {
        "A": "A primeira",
        "B": "A última",
        "C": "As duas"
      },
      "gabarito": "B",
      "tipo": "multipla",
      "explicacao": "A deduplicação mantém a última resposta por aluno e questão."
    }
  ]
}
"#;
