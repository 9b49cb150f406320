//! Prompt building for SQL generation and answer rephrasing

/// Build the SQL generation prompt.
///
/// Values are substituted in a single pass, so braces inside the question or
/// the schema description are never expanded.
pub fn build_sql_prompt(question: &str, schema_description: &str, result_cap: usize) -> String {
    format!(
        r#"
You are a SQLite expert. Given a natural language input question, perform the following steps:

1. Understand the user's intent, even if the question contains typos, grammar issues or misspelled names.
2. Write one syntactically correct and executable SQL query that answers it.
3. Use only the tables and columns described below. Never assume tables or columns that are not listed.
4. Return at most {top_k} rows, if applicable.

## Matching Rules:
- Every string/text comparison MUST be case-insensitive.
- Compare with `LOWER(column_name) = LOWER('value')` (or `LOWER(column_name) LIKE LOWER('%value%')` for partial matches).
- Tolerate minor typos and fuzzy name matches when inferring which value is meant.
- Wrap column names in double quotes exactly as they appear below.
- Write table names with the same letter case as below.

## Allowed Tables:
{table_info}

## Output Formatting Rules:
- Do not explain the SQL query or add anything besides the query itself.
- Do not invent data that is not present in the database.
- End the query with a semicolon.

## SQL Query Formatting:
- When combining SELECT statements with `UNION` or `UNION ALL`, do NOT put a `LIMIT` clause inside the individual SELECT statements.
- Apply a single `LIMIT` clause after the whole UNION expression instead.
- Keep clauses in their correct order.

Question: {question}
"#,
        table_info = schema_description,
        top_k = result_cap,
        question = question,
    )
}

/// Build the answer rephrasing prompt
pub fn build_answer_prompt(question: &str, query: &str, result: &str) -> String {
    format!(
        r#"
Given the user question, the SQL query that was run for it and the SQL result, format the result into a clear, structured answer that follows the intent of the question.
- Do NOT invent or add data that is not present in the SQL result.
- Use key names derived from the result columns and the context of the question.
- Only include keys present in the SQL result.
- If the result is a list of items, present it as a table with the correct column names.
- If the result is a single numeric aggregate (e.g. COUNT, SUM, AVG), answer with one plain sentence.

Question: {question}
SQL Query: {query}
SQL Result: {result}
Answer:
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_sql_prompt() {
        let prompt = build_sql_prompt(
            "how many raid points did pawan score",
            "CREATE TABLE S_RBR (\n\t\"player\" TEXT\n)",
            5,
        );

        assert!(prompt.contains("SQLite expert"));
        assert!(prompt.contains("case-insensitive"));
        assert!(prompt.contains("typos"));
        assert!(prompt.contains("CREATE TABLE S_RBR"));
        assert!(prompt.contains("at most 5 rows"));
        assert!(prompt.contains("single `LIMIT` clause after the whole UNION"));
        assert!(prompt.trim_end().ends_with("Question: how many raid points did pawan score"));
        assert!(!prompt.contains("{table_info}"));
        assert!(!prompt.contains("{top_k}"));
    }

    #[test]
    fn test_build_sql_prompt_keeps_braces_in_question() {
        let prompt = build_sql_prompt("what is {top_k}?", "schema {x}", 3);
        assert!(prompt.contains("Question: what is {top_k}?"));
        assert!(prompt.contains("schema {x}"));
    }

    #[test]
    fn test_build_answer_prompt() {
        let prompt = build_answer_prompt(
            "top raiders",
            "SELECT player FROM S_RBR LIMIT 5;",
            "| player |\n| Pawan |",
        );

        assert!(prompt.contains("Question: top raiders"));
        assert!(prompt.contains("SQL Query: SELECT player FROM S_RBR LIMIT 5;"));
        assert!(prompt.contains("SQL Result: | player |\n| Pawan |"));
        assert!(prompt.contains("Do NOT invent"));
        assert!(prompt.contains("as a table"));
        assert!(prompt.contains("one plain sentence"));
        assert!(prompt.trim_end().ends_with("Answer:"));
    }
}
