//! Implements InputPort. Inquire-based interactive menu.
//!
//! Menu: AI 학사 지식인 (Q&A) / 이수학점 진단 / 스마트 시간표 / 지식 캐시 재생성.

use crate::adapters::knowledge::TextKnowledgeLoader;
use crate::adapters::ui::{progress, timetable_view};
use crate::domain::{ChatRole, ChatTurn, Course, DomainError};
use crate::ports::InputPort;
use crate::usecases::{AddOutcome, AdvisorService, CreditService, TimetableService};
use async_trait::async_trait;
use inquire::error::InquireError;
use inquire::ui::{Color, RenderConfig, Styled};
use inquire::{Confirm, CustomType, Select, Text};
use std::fmt;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Applies the prompt theme for all subsequent inquire prompts.
pub fn apply_theme() {
    let config = RenderConfig::default()
        .with_prompt_prefix(Styled::new("›").with_fg(Color::LightYellow))
        .with_highlighted_option_prefix(Styled::new("▶").with_fg(Color::LightRed));
    inquire::set_global_render_config(config);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MainMenu {
    Advisor,
    Credits,
    Timetable,
    RebuildCache,
    Quit,
}

impl MainMenu {
    const ALL: [MainMenu; 5] = [
        MainMenu::Advisor,
        MainMenu::Credits,
        MainMenu::Timetable,
        MainMenu::RebuildCache,
        MainMenu::Quit,
    ];
}

impl fmt::Display for MainMenu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MainMenu::Advisor => "🤖 AI 학사 지식인",
            MainMenu::Credits => "📊 이수학점 진단",
            MainMenu::Timetable => "📅 스마트 시간표",
            MainMenu::RebuildCache => "📚 지식 캐시 재생성",
            MainMenu::Quit => "종료",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimetableMenu {
    Add,
    Remove,
    Show,
    Save,
    Clear,
    Back,
}

impl fmt::Display for TimetableMenu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TimetableMenu::Add => "과목 추가",
            TimetableMenu::Remove => "과목 삭제",
            TimetableMenu::Show => "시간표 보기",
            TimetableMenu::Save => "저장",
            TimetableMenu::Clear => "전체 비우기",
            TimetableMenu::Back => "뒤로",
        })
    }
}

/// Catalog entry as shown in the picker.
struct CourseOption(Course);

impl fmt::Display for CourseOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = &self.0;
        let slots = if c.slots.is_unscheduled() {
            "시간 미지정".to_string()
        } else {
            c.slots.to_string()
        };
        write!(f, "{} | {}", c.name, slots)?;
        if let Some(p) = &c.professor {
            write!(f, " | {}", p)?;
        }
        if let Some(a) = c.area {
            write!(f, " | {}", a)?;
        }
        Ok(())
    }
}

/// Message shown to the user for a failed question.
fn user_message(err: &DomainError) -> String {
    match err {
        DomainError::RateLimited(_) | DomainError::Unavailable(_) => {
            "⏳ 서버가 혼잡합니다. 잠시 후 다시 시도해주세요.".to_string()
        }
        DomainError::Cancelled(_) => "취소되었습니다.".to_string(),
        DomainError::KnowledgeEmpty => {
            "⚠️ 학습된 데이터가 없습니다. data 폴더에 문서(.pdf/.txt/.md)를 넣어주세요.".to_string()
        }
        other => format!("❌ AI 오류: {}", other),
    }
}

/// true when the user backed out of a prompt (Esc / Ctrl-C).
fn is_dismissed(err: &InquireError) -> bool {
    matches!(
        err,
        InquireError::OperationCanceled | InquireError::OperationInterrupted
    )
}

fn input_err(e: InquireError) -> DomainError {
    DomainError::Input(e.to_string())
}

/// Dismissing a yes/no prompt counts as "no".
fn confirm_answer(answer: Result<bool, InquireError>) -> Result<bool, DomainError> {
    match answer {
        Ok(yes) => Ok(yes),
        Err(e) if is_dismissed(&e) => Ok(false),
        Err(e) => Err(input_err(e)),
    }
}

fn confirm(message: &str) -> Result<bool, DomainError> {
    confirm_answer(Confirm::new(message).with_default(false).prompt())
}

/// TUI adapter. Holds the use cases it drives.
pub struct TuiInputPort {
    advisor: RwLock<AdvisorService>,
    loader: Arc<TextKnowledgeLoader>,
    credits: CreditService,
    timetable: Arc<TimetableService>,
    history: Mutex<Vec<ChatTurn>>,
}

impl TuiInputPort {
    pub fn new(
        advisor: AdvisorService,
        loader: Arc<TextKnowledgeLoader>,
        credits: CreditService,
        timetable: Arc<TimetableService>,
    ) -> Self {
        Self {
            advisor: RwLock::new(advisor),
            loader,
            credits,
            timetable,
            history: Mutex::new(Vec::new()),
        }
    }

    async fn run_advisor(&self) -> Result<(), DomainError> {
        {
            let advisor = self.advisor.read().await;
            println!(
                "📚 현재 {}개의 문서를 학습했습니다. 빈 입력으로 메뉴에 돌아갑니다.",
                advisor.knowledge().documents.len()
            );
        }
        for turn in self.history.lock().await.iter() {
            let who = match turn.role {
                ChatRole::User => "🙋",
                ChatRole::Assistant => "🤖",
            };
            println!("{} {}", who, turn.content);
        }

        loop {
            let question = match Text::new("질문하세요 (예: 이번 학기 장학금 기준이 뭐야?)").prompt() {
                Ok(q) => q,
                Err(e) if is_dismissed(&e) => return Ok(()),
                Err(e) => return Err(input_err(e)),
            };
            if question.trim().is_empty() {
                return Ok(());
            }

            let token = CancellationToken::new();
            let ctrl_c = {
                let token = token.clone();
                tokio::spawn(async move {
                    if tokio::signal::ctrl_c().await.is_ok() {
                        token.cancel();
                    }
                })
            };
            let spinner = progress::spinner("문서를 검색 중입니다... (Ctrl-C: 취소)");
            let result = self.advisor.read().await.ask(&question, &token).await;
            spinner.finish_and_clear();
            ctrl_c.abort();

            let answer = match result {
                Ok(answer) => answer,
                Err(e) => {
                    warn!(error = %e, "question failed");
                    user_message(&e)
                }
            };
            println!("🤖 {}\n", answer);

            let mut history = self.history.lock().await;
            history.push(ChatTurn {
                role: ChatRole::User,
                content: question,
            });
            history.push(ChatTurn {
                role: ChatRole::Assistant,
                content: answer,
            });
        }
    }

    async fn run_credits(&self) -> Result<(), DomainError> {
        let max = self.credits.required();
        let ask = |label: &str, default: u32| -> Result<Option<u32>, DomainError> {
            match CustomType::<u32>::new(label)
                .with_default(default)
                .with_error_message("0 이상의 정수를 입력하세요")
                .prompt()
            {
                Ok(v) => Ok(Some(v)),
                Err(e) if is_dismissed(&e) => Ok(None),
                Err(e) => Err(input_err(e)),
            }
        };
        let Some(major) = ask("전공 이수 학점", 45u32.min(max))? else {
            return Ok(());
        };
        let Some(general) = ask("교양 이수 학점", 20u32.min(max))? else {
            return Ok(());
        };

        match self.credits.diagnose(major, general) {
            Ok(report) => {
                println!("현재 총 이수 {}", progress::credit_bar(&report));
                if report.is_complete() {
                    println!("🎓 졸업 이수 학점을 모두 채웠습니다.");
                } else {
                    println!("남은 학점: {}", report.remaining);
                }
            }
            Err(e) => println!("⚠️ {}", e),
        }
        Ok(())
    }

    async fn run_timetable(&self) -> Result<(), DomainError> {
        loop {
            let options = vec![
                TimetableMenu::Add,
                TimetableMenu::Remove,
                TimetableMenu::Show,
                TimetableMenu::Save,
                TimetableMenu::Clear,
                TimetableMenu::Back,
            ];
            let choice = match Select::new("시간표", options).prompt() {
                Ok(c) => c,
                Err(e) if is_dismissed(&e) => return Ok(()),
                Err(e) => return Err(input_err(e)),
            };
            match choice {
                TimetableMenu::Add => self.add_course_prompt().await?,
                TimetableMenu::Remove => self.remove_course_prompt().await?,
                TimetableMenu::Show => {
                    println!("{}", timetable_view::render_grid(&self.timetable.selected().await));
                }
                TimetableMenu::Save => match self.timetable.save().await {
                    Ok(()) => println!("💾 저장했습니다."),
                    Err(e) => println!("⚠️ 저장 실패: {}", e),
                },
                TimetableMenu::Clear => {
                    if confirm("선택한 과목을 모두 비울까요?")? {
                        self.timetable.clear().await;
                        println!("🗑️ 시간표를 비웠습니다.");
                    }
                }
                TimetableMenu::Back => return Ok(()),
            }
        }
    }

    async fn add_course_prompt(&self) -> Result<(), DomainError> {
        let catalog = match self.timetable.catalog().await {
            Ok(c) => c,
            Err(e) => {
                println!("⚠️ {}", e);
                return Ok(());
            }
        };
        let options: Vec<CourseOption> = catalog.into_iter().map(CourseOption).collect();
        let picked = match Select::new("추가할 과목", options).prompt() {
            Ok(p) => p.0,
            Err(e) if is_dismissed(&e) => return Ok(()),
            Err(e) => return Err(input_err(e)),
        };

        match self.timetable.add_course(picked.clone(), false).await? {
            AddOutcome::Added => println!("✅ '{}' 추가됨", picked.name),
            AddOutcome::AlreadySelected => println!("이미 선택한 과목입니다."),
            AddOutcome::Conflict { with, shared } => {
                let slots: Vec<String> = shared.iter().map(|s| s.to_string()).collect();
                let force = confirm(&format!(
                    "'{}'와(과) {} 시간이 겹칩니다. 그래도 추가할까요?",
                    with,
                    slots.join(",")
                ))?;
                if force {
                    self.timetable.add_course(picked, true).await?;
                    println!("⚠️ 겹치는 채로 추가했습니다.");
                }
            }
            AddOutcome::ForcedOverlap { .. } => {}
        }
        Ok(())
    }

    async fn remove_course_prompt(&self) -> Result<(), DomainError> {
        let names: Vec<String> = self
            .timetable
            .selected()
            .await
            .courses()
            .iter()
            .map(|c| c.name.clone())
            .collect();
        if names.is_empty() {
            println!("선택한 과목이 없습니다.");
            return Ok(());
        }
        match Select::new("삭제할 과목", names).prompt() {
            Ok(name) => {
                self.timetable.remove(&name).await;
                println!("🗑️ '{}' 삭제됨", name);
                Ok(())
            }
            Err(e) if is_dismissed(&e) => Ok(()),
            Err(e) => Err(input_err(e)),
        }
    }

    async fn rebuild_cache(&self) {
        match self.loader.rebuild_cache().await {
            Ok(kb) => {
                println!("✅ {}개 문서로 캐시를 다시 만들었습니다.", kb.documents.len());
                self.advisor.write().await.set_knowledge(Arc::new(kb));
            }
            Err(e) => println!("⚠️ {}", user_message(&e)),
        }
    }
}

#[async_trait]
impl InputPort for TuiInputPort {
    async fn run(&self) -> Result<(), DomainError> {
        loop {
            let choice = match Select::new("메뉴", MainMenu::ALL.to_vec()).prompt() {
                Ok(c) => c,
                Err(e) if is_dismissed(&e) => return Ok(()),
                Err(e) => return Err(input_err(e)),
            };
            match choice {
                MainMenu::Advisor => self.run_advisor().await?,
                MainMenu::Credits => self.run_credits().await?,
                MainMenu::Timetable => self.run_timetable().await?,
                MainMenu::RebuildCache => self.rebuild_cache().await,
                MainMenu::Quit => return Ok(()),
            }
        }
    }
}
