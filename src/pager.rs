use crate::error::PeekError;
use crate::fetcher::PageSource;
use crate::input::{KeySource, Keystroke};
use crate::model::{ContinueToken, PageRequest, PeekMode};
use crate::options::PeekContext;
use crate::render::Renderer;
use std::io::Write;
use tracing::{debug, warn};

pub const NO_RESOURCES: &str = "No resources found.";
const END_OF_LIST: &str = "--- End of list ---";
const PROMPT: &str = "--- [n] next page, [q] quit: ";
const NEXT_KEY: char = 'n';

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PagerOutcome {
    /// The very first page came back empty.
    NoResources,
    /// The server reported no further pages.
    Exhausted,
    /// Single pass stopped with more pages available.
    TokenIssued(ContinueToken),
    /// The user declined to continue, or the keystroke could not be read.
    Stopped,
}

#[derive(Debug)]
struct Session {
    current_token: Option<ContinueToken>,
    is_first_page: bool,
    pages: usize,
}

pub struct Pager<'a> {
    context: &'a PeekContext,
    renderer: Renderer,
}

impl<'a> Pager<'a> {
    pub fn new(context: &'a PeekContext) -> Self {
        let show_namespace = context.resource.namespaced && context.scope.namespace().is_none();
        Self {
            context,
            renderer: Renderer::new(context.format, show_namespace),
        }
    }

    /// Drives fetch, render and decide until the loop terminates. Pages are
    /// written to `out`; in single pass mode with a structured output format
    /// the continue token goes to `aside` so `out` stays one document.
    pub async fn run<S, K>(
        &self,
        source: &S,
        keys: &mut K,
        out: &mut dyn Write,
        aside: &mut dyn Write,
    ) -> Result<PagerOutcome, PeekError>
    where
        S: PageSource,
        K: KeySource,
    {
        let mut session = Session {
            current_token: self.context.mode.initial_token(),
            is_first_page: true,
            pages: 0,
        };

        loop {
            let request = PageRequest {
                limit: self.context.limit,
                continue_token: session.current_token.take(),
                label_selector: self.context.selector.clone(),
                scope: self.context.scope.clone(),
            };
            let page = source.fetch_page(&self.context.resource, &request).await?;

            if session.is_first_page && page.is_empty() {
                writeln!(out, "{NO_RESOURCES}")?;
                return Ok(PagerOutcome::NoResources);
            }

            self.renderer.render(&page.body, out)?;
            session.is_first_page = false;
            session.pages += 1;
            debug!(page = session.pages, items = page.len(), "rendered page");

            let Some(token) = page.next_token else {
                if self.context.mode.is_interactive() {
                    writeln!(out, "\n{END_OF_LIST}")?;
                }
                out.flush()?;
                return Ok(PagerOutcome::Exhausted);
            };

            match &self.context.mode {
                PeekMode::SinglePass { .. } => {
                    if self.renderer.format().is_tabular() {
                        writeln!(out, "\nContinue Token: {token}")?;
                        out.flush()?;
                    } else {
                        writeln!(aside, "\nContinue Token: {token}")?;
                        aside.flush()?;
                    }
                    return Ok(PagerOutcome::TokenIssued(token));
                }
                PeekMode::Interactive => {
                    write!(out, "\n{PROMPT}")?;
                    out.flush()?;
                    let key = keys.next_key();
                    writeln!(out)?;

                    match key {
                        Ok(Keystroke::Char(NEXT_KEY)) => session.current_token = Some(token),
                        Ok(_) => return Ok(PagerOutcome::Stopped),
                        Err(error) => {
                            warn!(error = %PeekError::Input(error), "stopping pager");
                            return Ok(PagerOutcome::Stopped);
                        }
                    }
                }
            }
        }
    }
}
