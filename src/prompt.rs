use std::fmt;

/// The final text sent to the generation service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationPrompt(String);

impl GenerationPrompt {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GenerationPrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Wraps the context block and the user's question in the fixed instruction
/// template. An empty context still yields the context section, so the model
/// sees that nothing was found and declines instead of guessing.
pub fn build_prompt(context: &str, question: &str) -> GenerationPrompt {
    GenerationPrompt(format!(
        "You are a helpful AI assistant with access to a knowledge base.\n\
         \n\
         Context information from documents:\n\
         {context}\n\
         \n\
         User question: {question}\n\
         \n\
         Provide a helpful, accurate response based on the context information. \
         If the question cannot be answered based on the provided context, say so politely."
    ))
}
