//! Prompt assembly and output cleanup for SQL generation.

use askdb_core::TrainingArtifact;

/// Instructions preceding the in-context training examples.
pub const SQL_SYSTEM_PROMPT: &str = "你是一个专业的 SQL 专家。请根据用户的问题生成准确的 MySQL SQL 查询语句。

注意以下要点：
1. 只返回 SQL 代码，不要包含解释
2. 使用正确的 MySQL 语法
3. 如果问题中涉及到表名，请使用完整的 database.table 格式
4. 确保 SQL 语法正确
5. 如果用户问题不明确，做出合理的假设并说明在注释中

可用上下文信息：";

/// The last `window` items of `artifacts`, oldest first.
#[must_use]
pub fn recent(artifacts: &[TrainingArtifact], window: usize) -> &[TrainingArtifact] {
    &artifacts[artifacts.len().saturating_sub(window)..]
}

/// One context block per artifact.
#[must_use]
pub fn render_context(artifacts: &[TrainingArtifact]) -> String {
    artifacts
        .iter()
        .map(|artifact| match artifact {
            TrainingArtifact::Ddl { ddl } => format!("\n\nDDL结构:\n{ddl}"),
            TrainingArtifact::Documentation { documentation } => {
                format!("\n\n表说明:\n{documentation}")
            }
            TrainingArtifact::QuestionSql { question, sql } => {
                format!("\n\n示例查询:\n问题: {question}\nSQL: {sql}")
            }
            TrainingArtifact::Plan { plan } => format!("\n\n查询计划:\n{plan}"),
        })
        .collect()
}

/// Full system prompt: instructions, recent examples, optional database context.
#[must_use]
pub fn system_prompt(examples: &[TrainingArtifact], db_context: Option<&str>) -> String {
    let mut prompt = String::from(SQL_SYSTEM_PROMPT);
    prompt.push_str(&render_context(examples));
    if let Some(context) = db_context.filter(|c| !c.trim().is_empty()) {
        prompt.push_str("\n\n当前数据库上下文:\n");
        prompt.push_str(context);
    }
    prompt
}

/// Remove Markdown code fences the model wraps SQL in.
#[must_use]
pub fn strip_code_fences(text: &str) -> String {
    text.replace("```sql", "").replace("```", "").trim().to_string()
}
