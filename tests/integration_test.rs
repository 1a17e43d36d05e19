use async_trait::async_trait;
use extract_question_upload::orchestrator::{assemble_records, upload_records};
use extract_question_upload::services::{AnswerParser, QuestionParser, ShapeLinker};
use extract_question_upload::{
    App, Config, InsertOutcome, McqRecord, PaperCtx, RecordStore, Shape,
};
use std::sync::Mutex;

/// 收集写入记录的内存存储
#[derive(Default)]
struct InMemoryStore {
    inserted: Mutex<Vec<McqRecord>>,
}

#[async_trait]
impl RecordStore for InMemoryStore {
    async fn insert(
        &self,
        _table: &str,
        records: &[McqRecord],
    ) -> anyhow::Result<InsertOutcome> {
        self.inserted.lock().unwrap().extend_from_slice(records);
        Ok(InsertOutcome {
            rows_written: records.len(),
        })
    }
}

fn sample_ctx() -> PaperCtx {
    PaperCtx::new(
        "数学".to_string(),
        "2024".to_string(),
        Some("paper-001".to_string()),
        "测试试卷".to_string(),
    )
}

/// 不经过外部协作方的全流程：解析 → 归属 → 组装 → 上传
#[tokio::test]
async fn test_pipeline_from_markup_to_records() {
    let questions_tex = concat!(
        "\\textbf{1.} What is 2+2?\n",
        "\\begin{longtable}[]{ll}\nA. 3\\\\\nB. 4\\\\\n\\end{longtable}\n",
        "\\textbf{2.} 参照图形回答\n",
        "\\begin{longtable}[]{l}\nA. 正确\\\\\nB. 错误\\\\\n\\end{longtable}\n",
    );
    let answers_tex = concat!(
        "\\textbf{1.} Because math. \\textbf{Answer}: B\n",
        "\\textbf{2.} 见 Shape 1 \\textbf{Answer}: A\n",
    );

    let shapes = vec![Shape {
        shape_type: "spPr".to_string(),
        context: vec!["图 2".to_string()],
        ..Default::default()
    }];

    // 解析
    let mut questions = QuestionParser::new().parse(questions_tex).unwrap();
    let mut answers = AnswerParser::new().parse(answers_tex, &shapes).unwrap();

    assert_eq!(questions.len(), 2);
    assert_eq!(answers.len(), 2);
    // 答案区块里的形状回引指向全局形状序列
    assert_eq!(answers[&2].shapes.len(), 1);

    // 形状归属：上下文 "图 2" 数字直配到题目 2
    let stats = ShapeLinker::new()
        .link(&shapes, &mut questions, &mut answers)
        .unwrap();
    assert_eq!(stats.to_questions, 1);
    assert_eq!(questions[1].shapes.len(), 1);

    // 组装 + 上传
    let (records, without_answer) =
        assemble_records(&questions, &answers, &sample_ctx()).unwrap();
    assert_eq!(without_answer, 0);

    let store = InMemoryStore::default();
    let outcome = upload_records(&store, "questions", &records, 3)
        .await
        .unwrap();
    assert_eq!(outcome.rows_written, 2);

    let inserted = store.inserted.lock().unwrap();
    assert_eq!(inserted.len(), 2);

    let first = &inserted[0];
    assert_eq!(first.question_number, 1);
    assert_eq!(first.question_text, "What is 2+2?");
    assert_eq!(first.correct_answer.as_deref(), Some("B"));
    assert_eq!(first.explanation.as_deref(), Some("Because math."));
    assert_eq!(first.subject, "数学");
    assert_eq!(first.year, "2024");
    assert_eq!(first.test_id.as_deref(), Some("paper-001"));

    // 选项序列化保持字母顺序
    let options: Vec<serde_json::Value> = serde_json::from_str(&first.options).unwrap();
    assert_eq!(options[0]["option"], "A");
    assert_eq!(options[0]["choice"], "3");
    assert_eq!(options[1]["option"], "B");
    assert_eq!(options[1]["choice"], "4");
}

/// 没有答案区块时题目照常上传，答案字段置空
#[tokio::test]
async fn test_pipeline_without_answers() {
    let questions_tex =
        "\\textbf{7.} 只有题目\\begin{longtable}[]{l}A. 甲\\\\B. 乙\\\\\\end{longtable}";

    let mut questions = QuestionParser::new().parse(questions_tex).unwrap();
    let mut answers = AnswerParser::new().parse("没有任何答案", &[]).unwrap();
    assert!(answers.is_empty());

    ShapeLinker::new()
        .link(&[], &mut questions, &mut answers)
        .unwrap();

    let (records, without_answer) =
        assemble_records(&questions, &answers, &sample_ctx()).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(without_answer, 1);
    assert_eq!(records[0].correct_answer, None);
    assert_eq!(records[0].explanation, None);
}

/// 需要本机安装 pandoc 且配置好文档与记录存储：
/// cargo test -- --ignored
#[tokio::test]
#[ignore]
async fn test_process_real_document_pair() {
    extract_question_upload::utils::logging::init();

    let config = Config::from_env();

    let app = App::initialize(config).await.expect("初始化失败");
    app.run().await.expect("处理文档对失败");
}
