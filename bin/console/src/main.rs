//! Interactive console host for the knowledge-base dialogs.
//!
//! Wires the search orchestrators, the article-list dialog, and the
//! article-view dialog to stdin/stdout with an in-memory session store.
//! Type `search <question>`, `find <document id>` (optionally
//! `find <id> | <title>`), a result number to open an article, and
//! `quit` to exit.

mod config;

use config::ConsoleConfig;
use helpdesk_kb_client::{KnowledgeClient, TokenStore};
use helpdesk_kb_core::{
    ChannelType, ConversationSessionId, MemorySessionStore, SessionStoreExt, TurnId, keys,
};
use helpdesk_kb_dialog::{
    ArticleListDialog, ListEntry, OutboundMessage, Transition, TurnInput, TurnOutput,
    ViewArticleDialog,
};
use helpdesk_kb_render::RendererRegistry;
use helpdesk_kb_search::{FindArticle, FindQuery, QuestionSearch, SearchOutcome, SearchVars};
use std::io::{BufRead, Write};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const NO_RESULTS_REPLY: &str =
    "I couldn't find any articles for that. Try different words, or type *help*.";
const REST_ERROR_REPLY: &str =
    "Something went wrong talking to the knowledge base. Please try again later.";
const HELP_REPLY: &str = "Commands: search <question>, find <document id>, \
    find <id> | <title>, a result number to open it, quit.";

/// Which dialog owns the next inbound turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlowState {
    Intent,
    List,
    View,
}

struct ConsoleSession {
    question: QuestionSearch,
    find: FindArticle,
    list: ArticleListDialog,
    view: ViewArticleDialog,
    store: MemorySessionStore,
    channel: ChannelType,
    state: FlowState,
    session_id: ConversationSessionId,
    /// Entries of the most recent list page, for number selection.
    last_page: Vec<ListEntry>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ConsoleConfig::from_env().expect("failed to load configuration");
    tracing::info!(tenant = %config.tenant.tenant_key(), "loaded configuration");

    let tokens = Arc::new(TokenStore::new());
    let client = KnowledgeClient::with_default_transport(config.tenant.clone(), tokens)
        .expect("failed to build HTTP client");
    let registry = Arc::new(RendererRegistry::standard());
    let vars = SearchVars::named("search_results", "selected_answer_id", "search_has_results");

    let mut session = ConsoleSession {
        question: QuestionSearch::new(client.clone(), vars.clone()),
        find: FindArticle::new(client.clone(), vars.clone()),
        list: ArticleListDialog::new(
            vars.clone(),
            Arc::clone(&registry),
            config.tenant.customer_portal.clone(),
        ),
        view: ViewArticleDialog::new(client, vars, registry),
        store: MemorySessionStore::new(),
        channel: config.channel,
        state: FlowState::Intent,
        session_id: ConversationSessionId::new(),
        last_page: Vec::new(),
    };
    tracing::info!(session = %session.session_id, "console session started");

    println!("{HELP_REPLY}");
    let stdin = std::io::stdin();
    loop {
        print!("> ");
        std::io::stdout().flush().expect("flush stdout");
        let mut line = String::new();
        if stdin.lock().read_line(&mut line).expect("read stdin") == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if matches!(line, "quit" | "exit") {
            break;
        }
        session.handle_line(line).await;
    }
}

impl ConsoleSession {
    async fn handle_line(&mut self, line: &str) {
        tracing::debug!(
            session = %self.session_id,
            turn = %TurnId::new(),
            state = ?self.state,
            "processing turn"
        );
        match self.state {
            FlowState::Intent => self.handle_command(line).await,
            FlowState::List => {
                let input = self.list_input(line);
                let output = match self.list.invoke(&self.store, &input).await {
                    Ok(output) => output,
                    Err(err) => {
                        tracing::error!(%err, "list dialog failed");
                        println!("{REST_ERROR_REPLY}");
                        self.reset_to_intent().await;
                        return;
                    }
                };
                self.apply(output, &input, line).await;
            }
            FlowState::View => {
                let input = TurnInput::text(line);
                let output = match self.view.invoke(&self.store, &input, self.channel).await {
                    Ok(output) => output,
                    Err(err) => {
                        tracing::error!(%err, "view dialog failed");
                        println!("{REST_ERROR_REPLY}");
                        self.reset_to_intent().await;
                        return;
                    }
                };
                self.apply(output, &input, line).await;
            }
        }
    }

    async fn handle_command(&mut self, line: &str) {
        let outcome = if let Some(question) = line.strip_prefix("search ") {
            self.begin_search().await;
            self.question.invoke(&self.store, question.trim()).await
        } else if let Some(rest) = line.strip_prefix("find ") {
            self.begin_search().await;
            let (id, title) = match rest.split_once('|') {
                Some((id, title)) => (id.trim(), Some(title.trim())),
                None => (rest.trim(), None),
            };
            let query = FindQuery {
                document_id: Some(id.to_string()).filter(|id| !id.is_empty()),
                title: title.map(str::to_string).filter(|t| !t.is_empty()),
            };
            self.find.invoke(&self.store, &query).await
        } else {
            println!("{HELP_REPLY}");
            return;
        };

        match outcome {
            Ok(SearchOutcome::NoResults) => println!("{NO_RESULTS_REPLY}"),
            Ok(SearchOutcome::ViewResults) => {
                self.enter_list().await;
            }
            Ok(SearchOutcome::ViewArticle { announcement }) => {
                if let Some(announcement) = announcement {
                    println!("{announcement}");
                }
                self.enter_view().await;
            }
            Err(err) => {
                tracing::error!(%err, "search failed");
                println!("{REST_ERROR_REPLY}");
            }
        }
    }

    /// Maps a typed result number to its minted postback.
    fn list_input(&self, line: &str) -> TurnInput {
        if let Ok(number) = line.parse::<usize>() {
            if let Some(entry) = number
                .checked_sub(1)
                .and_then(|index| self.last_page.get(index))
            {
                return TurnInput::postback(entry.postback.clone());
            }
        }
        TurnInput::text(line)
    }

    async fn apply(&mut self, output: TurnOutput, input: &TurnInput, line: &str) {
        self.print_messages(&output.messages);
        match output.transition {
            None => {}
            Some(Transition::ViewArticle) => {
                self.state = FlowState::View;
                self.store.set(&keys::VIEW_SHOWN, &false).await.expect("session store");
                if output.keep_turn {
                    // The view dialog renders on entry; the postback rides
                    // along so link entries need no fetch.
                    let entry = TurnInput {
                        text: None,
                        postback: input.postback.clone(),
                    };
                    match self.view.invoke(&self.store, &entry, self.channel).await {
                        Ok(next) => Box::pin(self.apply(next, &entry, line)).await,
                        Err(err) => {
                            tracing::error!(%err, "view dialog failed");
                            println!("{REST_ERROR_REPLY}");
                            self.reset_to_intent().await;
                        }
                    }
                }
            }
            Some(Transition::ViewResults) => {
                self.enter_list().await;
            }
            Some(Transition::Intent) => {
                self.reset_to_intent().await;
                if output.keep_turn {
                    Box::pin(self.handle_command(line)).await;
                }
            }
            Some(Transition::Done) => {
                self.reset_to_intent().await;
            }
            Some(Transition::RestError) => {
                println!("{REST_ERROR_REPLY}");
                self.reset_to_intent().await;
            }
        }
    }

    /// Clears per-search dialog state before a new search runs.
    async fn begin_search(&mut self) {
        self.store.set(&keys::LIST_SHOWN, &false).await.expect("session store");
        self.store.set(&keys::VIEW_SHOWN, &false).await.expect("session store");
        self.store.set(&keys::INTENT_MATCH, &false).await.expect("session store");
        self.store.set(&keys::LIST_START_INDEX, &0).await.expect("session store");
        self.last_page.clear();
        self.state = FlowState::Intent;
    }

    /// Enters (or re-enters) the list dialog and renders the current page.
    async fn enter_list(&mut self) {
        self.store.set(&keys::LIST_SHOWN, &false).await.expect("session store");
        self.store.set(&keys::VIEW_SHOWN, &false).await.expect("session store");
        self.state = FlowState::List;
        let input = TurnInput::default();
        match self.list.invoke(&self.store, &input).await {
            Ok(output) => Box::pin(self.apply(output, &input, "")).await,
            Err(err) => {
                tracing::error!(%err, "list dialog failed");
                println!("{REST_ERROR_REPLY}");
                self.reset_to_intent().await;
            }
        }
    }

    /// Enters the view dialog and renders the selected article.
    async fn enter_view(&mut self) {
        self.store.set(&keys::VIEW_SHOWN, &false).await.expect("session store");
        self.state = FlowState::View;
        let input = TurnInput::default();
        match self.view.invoke(&self.store, &input, self.channel).await {
            Ok(output) => Box::pin(self.apply(output, &input, "")).await,
            Err(err) => {
                tracing::error!(%err, "view dialog failed");
                println!("{REST_ERROR_REPLY}");
                self.reset_to_intent().await;
            }
        }
    }

    async fn reset_to_intent(&mut self) {
        self.state = FlowState::Intent;
        self.last_page.clear();
        self.store.set(&keys::LIST_SHOWN, &false).await.expect("session store");
        self.store.set(&keys::VIEW_SHOWN, &false).await.expect("session store");
    }

    fn print_messages(&mut self, messages: &[OutboundMessage]) {
        for message in messages {
            match message {
                OutboundMessage::Text(text) => println!("{text}"),
                OutboundMessage::ArticleList { entries, start, .. } => {
                    for (offset, entry) in entries.iter().enumerate() {
                        println!("  {}. {}", start + offset + 1, entry.title);
                        if !entry.excerpt.is_empty() {
                            println!("     {}", entry.excerpt);
                        }
                    }
                    self.last_page = entries.clone();
                }
                OutboundMessage::Article {
                    sections,
                    article_url,
                } => {
                    for section in sections {
                        if !section.header.is_empty() {
                            println!("== {} ==", section.header);
                        }
                        if !section.content.is_empty() {
                            println!("{}", section.content);
                        }
                        if !section.image_url.is_empty() {
                            println!("[image] {}", section.image_url);
                        }
                    }
                    println!("View Full Article: {article_url}");
                }
            }
        }
    }
}
