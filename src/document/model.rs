/// An open document as last reported by the client.
#[derive(Clone, Debug)]
pub struct Document {
    text: String,
}

impl Document {
    pub fn new(text: String) -> Self {
        Self { text }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the content after a didChange.
    pub fn update(&mut self, text: String) {
        self.text = text;
    }
}
