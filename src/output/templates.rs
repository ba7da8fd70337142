//! Before/after migration examples
//!
//! One template per call-site category, rendered into the guide for every
//! category the scan actually detected.

use crate::scan::Category;

pub(crate) struct MigrationTemplate {
    pub(crate) category: Category,
    pub(crate) effort: &'static str,
    pub(crate) openai: &'static str,
    pub(crate) mistral: &'static str,
    pub(crate) notes: &'static str,
}

pub(crate) fn template_for(category: Category) -> Option<&'static MigrationTemplate> {
    TEMPLATES.iter().find(|t| t.category == category)
}

const TEMPLATES: &[MigrationTemplate] = &[
    MigrationTemplate {
        category: Category::Chat,
        effort: "trivial",
        openai: r#"# OpenAI Chat Completion
from openai import OpenAI

client = OpenAI(api_key="your-openai-key")

response = client.chat.completions.create(
    model="gpt-4",
    messages=[
        {"role": "system", "content": "You are a helpful assistant."},
        {"role": "user", "content": "Hello!"}
    ],
    temperature=0.7,
    max_tokens=150
)

print(response.choices[0].message.content)"#,
        mistral: r#"# Mistral Chat Completion
from mistralai.client import MistralClient

client = MistralClient(api_key="your-mistral-key")

response = client.chat(
    model="mistral-large-latest",
    messages=[
        {"role": "system", "content": "You are a helpful assistant."},
        {"role": "user", "content": "Hello!"}
    ],
    temperature=0.7,
    max_tokens=150
)

print(response.choices[0].message.content)"#,
        notes: r#"Key changes:
  * Import: openai.OpenAI -> mistralai.client.MistralClient
  * Method: client.chat.completions.create() -> client.chat()
  * Model: gpt-4 -> mistral-large-latest (or mistral-medium, mistral-small)
  * API is 99% compatible, most parameters work identically"#,
    },
    MigrationTemplate {
        category: Category::Streaming,
        effort: "trivial",
        openai: r#"# OpenAI Streaming
response = client.chat.completions.create(
    model="gpt-4",
    messages=[{"role": "user", "content": "Tell me a story"}],
    stream=True
)

for chunk in response:
    if chunk.choices[0].delta.content:
        print(chunk.choices[0].delta.content, end="")"#,
        mistral: r#"# Mistral Streaming
response = client.chat_stream(
    model="mistral-large-latest",
    messages=[{"role": "user", "content": "Tell me a story"}]
)

for chunk in response:
    if chunk.choices[0].delta.content:
        print(chunk.choices[0].delta.content, end="")"#,
        notes: r#"Key changes:
  * Method: client.chat.completions.create(stream=True) -> client.chat_stream()
  * Response handling is identical
  * Chunk structure is the same"#,
    },
    MigrationTemplate {
        category: Category::FunctionCalling,
        effort: "trivial",
        openai: r#"# OpenAI Function Calling
tools = [{
    "type": "function",
    "function": {
        "name": "get_weather",
        "description": "Get weather for a location",
        "parameters": {
            "type": "object",
            "properties": {
                "location": {"type": "string"}
            }
        }
    }
}]

response = client.chat.completions.create(
    model="gpt-4",
    messages=[{"role": "user", "content": "What's the weather in Paris?"}],
    tools=tools
)"#,
        mistral: r#"# Mistral Function Calling
tools = [{
    "type": "function",
    "function": {
        "name": "get_weather",
        "description": "Get weather for a location",
        "parameters": {
            "type": "object",
            "properties": {
                "location": {"type": "string"}
            }
        }
    }
}]

response = client.chat(
    model="mistral-large-latest",
    messages=[{"role": "user", "content": "What's the weather in Paris?"}],
    tools=tools
)"#,
        notes: r#"Key changes:
  * Tool schema format is identical, copy/paste works
  * Only difference: .create() -> .chat()
  * Function calling quality is excellent on mistral-large"#,
    },
    MigrationTemplate {
        category: Category::Embedding,
        effort: "easy",
        openai: r#"# OpenAI Embeddings
response = client.embeddings.create(
    model="text-embedding-ada-002",
    input="Your text to embed"
)

embedding = response.data[0].embedding"#,
        mistral: r#"# Mistral Embeddings
response = client.embeddings(
    model="mistral-embed",
    input=["Your text to embed"]
)

embedding = response.data[0].embedding"#,
        notes: r#"Key changes:
  * Method: client.embeddings.create() -> client.embeddings()
  * Input: single string -> list of strings (wrap in array)
  * Model: text-embedding-ada-002 -> mistral-embed
  * Dimension: 1536 -> 1024 (may need to reindex your vector DB)"#,
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_concrete_category_has_a_template() {
        for category in [
            Category::Chat,
            Category::Streaming,
            Category::Embedding,
            Category::FunctionCalling,
        ] {
            assert!(template_for(category).is_some(), "missing {category}");
        }
    }

    #[test]
    fn unknown_has_no_template() {
        assert!(template_for(Category::Unknown).is_none());
    }

    #[test]
    fn templates_show_both_sides() {
        let t = template_for(Category::Chat).unwrap();
        assert!(t.openai.contains("client.chat.completions.create"));
        assert!(t.mistral.contains("client.chat("));
        assert!(!t.notes.is_empty());
    }
}
