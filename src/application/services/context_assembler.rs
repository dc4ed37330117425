use serde::Serialize;
use std::fmt::Write;

use crate::application::services::sql_knowledge_base::SqlExampleMatch;
use crate::domain::entities::QueryContext;
use crate::domain::value_objects::Language;

#[derive(Debug)]
pub enum ContextAssemblyError {
    GenerationInput(String),
}

impl std::fmt::Display for ContextAssemblyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContextAssemblyError::GenerationInput(msg) => {
                write!(f, "Invalid generation input: {}", msg)
            }
        }
    }
}

impl std::error::Error for ContextAssemblyError {}

impl From<std::fmt::Error> for ContextAssemblyError {
    fn from(e: std::fmt::Error) -> Self {
        ContextAssemblyError::GenerationInput(e.to_string())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AssembledContext {
    pub language: Language,
    pub prompt: String,
}

struct PromptTemplate {
    intro: &'static str,
    rules_heading: &'static str,
    rules: [&'static str; 4],
    tables_heading: &'static str,
    columns_heading: &'static str,
    relations_heading: &'static str,
    examples_heading: &'static str,
    none_found: &'static str,
    question_heading: &'static str,
    answer_instruction: &'static str,
}

const ENGLISH: PromptTemplate = PromptTemplate {
    intro: "You are a SQL assistant. Write a query for the question below using only the schema listed here.",
    rules_heading: "Rules:",
    rules: [
        "Only read-only SELECT statements are allowed; never modify data or schema.",
        "Use standard SQL.",
        "Qualify every column with its table name or alias.",
        "Return at most {max_rows} rows.",
    ],
    tables_heading: "Relevant tables:",
    columns_heading: "Relevant columns:",
    relations_heading: "Table relationships:",
    examples_heading: "Similar SQL examples:",
    none_found: "(none found)",
    question_heading: "Question:",
    answer_instruction: "Answer with a single SQL statement in a ```sql code block.",
};

const CHINESE: PromptTemplate = PromptTemplate {
    intro: "你是一名 SQL 助手。请仅使用下面列出的表结构，为以下问题编写查询语句。",
    rules_heading: "规则：",
    rules: [
        "只允许只读的 SELECT 语句，禁止修改数据或表结构。",
        "使用标准 SQL。",
        "每个字段都必须带上表名或表别名。",
        "最多返回 {max_rows} 行。",
    ],
    tables_heading: "相关表：",
    columns_heading: "相关字段：",
    relations_heading: "表关系：",
    examples_heading: "相似的 SQL 示例：",
    none_found: "（未找到）",
    question_heading: "问题：",
    answer_instruction: "请只输出一条 SQL 语句，并放在 ```sql 代码块中。",
};

const TEMPLATES: [(Language, &PromptTemplate); 2] =
    [(Language::English, &ENGLISH), (Language::Chinese, &CHINESE)];

fn template_for(language: Language) -> &'static PromptTemplate {
    TEMPLATES
        .iter()
        .find(|(lang, _)| *lang == language)
        .map(|(_, template)| *template)
        .unwrap_or(&ENGLISH)
}

/// Turns retrieval output into the single prompt handed to the text generator.
pub struct ContextAssembler {
    default_language: Language,
    max_result_rows: usize,
}

impl ContextAssembler {
    pub fn new(default_language: Language, max_result_rows: usize) -> Self {
        Self {
            default_language,
            max_result_rows,
        }
    }

    pub fn detect_language(&self, query: &str) -> Language {
        Language::detect(query, self.default_language)
    }

    pub fn assemble(
        &self,
        context: &QueryContext,
        examples: &[SqlExampleMatch],
    ) -> Result<AssembledContext, ContextAssemblyError> {
        let query = context.query().trim();
        if query.is_empty() {
            return Err(ContextAssemblyError::GenerationInput(
                "query is empty".to_string(),
            ));
        }

        let language = self.detect_language(query);
        let template = template_for(language);
        let mut prompt = String::new();

        writeln!(prompt, "{}", template.intro)?;
        writeln!(prompt)?;

        writeln!(prompt, "{}", template.rules_heading)?;
        for (i, rule) in template.rules.iter().enumerate() {
            let rule = rule.replace("{max_rows}", &self.max_result_rows.to_string());
            writeln!(prompt, "{}. {}", i + 1, rule)?;
        }
        writeln!(prompt)?;

        writeln!(prompt, "{}", template.tables_heading)?;
        if context.relevant_tables().is_empty() {
            writeln!(prompt, "{}", template.none_found)?;
        }
        for hit in context.relevant_tables() {
            writeln!(prompt, "- {}", hit.descriptor.full_description())?;
        }
        writeln!(prompt)?;

        writeln!(prompt, "{}", template.columns_heading)?;
        let columns = context.columns_by_table();
        if columns.is_empty() {
            writeln!(prompt, "{}", template.none_found)?;
        }
        for (table, hits) in columns {
            writeln!(prompt, "{}:", table)?;
            for hit in hits {
                writeln!(prompt, "  - {}", hit.descriptor.full_description())?;
            }
        }

        if !context.related_tables().is_empty() {
            writeln!(prompt)?;
            writeln!(prompt, "{}", template.relations_heading)?;
            for (table, related) in context.related_tables() {
                writeln!(prompt, "- {} <-> {}", table, related.join(", "))?;
            }
        }

        if !examples.is_empty() {
            writeln!(prompt)?;
            writeln!(prompt, "{}", template.examples_heading)?;
            for m in examples {
                writeln!(prompt, "-- {}", m.example.name())?;
                writeln!(prompt, "```sql\n{}\n```", m.example.sql_text().trim())?;
            }
        }

        writeln!(prompt)?;
        writeln!(prompt, "{}", template.question_heading)?;
        writeln!(prompt, "{}", query)?;
        writeln!(prompt)?;
        write!(prompt, "{}", template.answer_instruction)?;

        Ok(AssembledContext { language, prompt })
    }
}
