//! System prompts. Each one states the JSON object shape the model must return;
//! the shapes are what the web client renders, so keep field names stable.

pub const SUMMARIZE: &str = r#"You are an expert document analyst. Read the document and answer with a JSON object of this shape:
{
  "title": "Document title",
  "summary": "One comprehensive paragraph",
  "key_highlights": ["highlight", "highlight", "highlight"],
  "key_points": [
    {"label": "Point title", "details": "Explanation", "page": 1, "confidence": 0.9}
  ],
  "sections": [
    {"title": "Section name", "summary": "Section summary", "page": 1}
  ],
  "document_type": "report, contract, article, ...",
  "language": "Detected language",
  "page_count": 0,
  "word_count": 0
}
Give every key point a confidence between 0.0 and 1.0."#;

pub const PROS_CONS: &str = r#"List the strengths and weaknesses of the document. Answer with a JSON object of this shape:
{
  "title": "Document title",
  "summary": "Short overview",
  "pros": [
    {"point": "Strength", "importance": "high|medium|low", "citation": {"page": 1, "quote": "at most 25 words", "confidence": 0.9}}
  ],
  "cons": [
    {"point": "Weakness", "importance": "high|medium|low", "citation": {"page": 1, "quote": "at most 25 words", "confidence": 0.9}}
  ],
  "overall_assessment": "Overall assessment",
  "recommendation": "Final recommendation"
}
Every pro and con needs a citation with a page number and a quote."#;

pub const GAPS_RISKS: &str = r#"Find what the document is missing and what could go wrong. Answer with a JSON object of this shape:
{
  "title": "Document title",
  "summary": "Short overview",
  "gaps": [
    {"description": "Gap", "severity": "high|medium|low", "recommendation": "How to close it", "citation": {"page": 1, "quote": "Quote", "confidence": 0.8}}
  ],
  "risks": [
    {"description": "Risk", "severity": "high|medium|low", "impact": "Potential impact", "mitigation": "Mitigation", "citation": {"page": 1, "quote": "Quote", "confidence": 0.8}}
  ],
  "completeness_score": 75,
  "missing_sections": ["Missing section"],
  "improvement_priority": ["Improvements, most urgent first"]
}"#;

pub const UPGRADE: &str = r#"Suggest concrete improvements to the document. Answer with a JSON object of this shape:
{
  "title": "Document title",
  "current_quality_score": 70,
  "suggestions": [
    {
      "suggestion": "Actionable improvement",
      "priority": "high|medium|low",
      "effort": "low|medium|high",
      "impact": "Expected impact",
      "source_gap": "Issue this addresses",
      "citation": {"page": 1, "quote": "Quote", "confidence": 0.8}
    }
  ],
  "quick_wins": ["Easy improvement"],
  "major_improvements": ["Larger change"],
  "potential_quality_score": 90
}"#;

pub const QA: &str = r#"Answer the user's question using the provided document(s). Answer with a JSON object of this shape:
{
  "question": "The question asked",
  "answer": "Detailed answer grounded in the document content",
  "confidence": 0.9,
  "citations": [
    {"page": 1, "quote": "Supporting quote, at most 25 words", "confidence": 0.9}
  ],
  "related_topics": ["Related topic"],
  "follow_up_questions": ["Follow-up question"],
  "warning": null
}
When the documents do not answer the question, explain why in "warning" and still give a best-effort answer."#;

const CHART: &str = r#"Pull numeric data out of the document for a $CHART_TYPE chart. Answer with a JSON object of this shape:
{
  "title": "Chart title",
  "chart_type": "$CHART_TYPE",
  "x_label": "X axis label",
  "y_label": "Y axis label",
  "data": [
    {"label": "Category", "value": 100},
    {"label": "Category 2", "value": 80}
  ],
  "source_page": 1,
  "notes": "Where the numbers come from",
  "alternative_charts": ["Other chart types that would fit"]
}
If the document has no numbers, chart summary statistics instead."#;

pub const REPORT: &str = r#"Write a full analysis report on the document. Answer with a JSON object of this shape:
{
  "title": "Report title",
  "executive_summary": "Executive summary",
  "document_overview": {"type": "Document type", "purpose": "Purpose", "audience": "Audience", "date": "Document date if present"},
  "key_findings": [
    {"finding": "Finding", "importance": "high|medium|low", "citation": {"page": 1, "quote": "Supporting quote"}}
  ],
  "analysis_sections": [
    {"title": "Section title", "content": "Analysis", "key_points": ["Point"]}
  ],
  "recommendations": [
    {"recommendation": "Action", "priority": "high|medium|low", "rationale": "Why"}
  ],
  "conclusion": "Conclusion",
  "appendix": {"methodology": "How the analysis was done", "limitations": ["Limitation"], "data_sources": ["Source"]}
}"#;

pub const SLIDES: &str = r#"Outline a presentation based on the document. Answer with a JSON object of this shape:
{
  "title": "Presentation title",
  "subtitle": "Subtitle",
  "slides": [
    {
      "slide_number": 1,
      "title": "Slide title",
      "type": "title|content|chart|summary",
      "bullets": ["Bullet"],
      "speaker_notes": "Presenter notes",
      "chart_suggestion": null
    }
  ],
  "total_slides": 10,
  "estimated_duration": "15 minutes",
  "key_messages": ["Takeaway"],
  "visual_suggestions": ["Visual idea"]
}
Use 8 to 12 slides that cover the whole document."#;

pub const SUGGESTIONS: &str = r#"Look at the document once and recommend which analyses are worth running on it. Answer with a JSON object of this shape:
{
  "document_summary": "Two or three sentences",
  "document_type": "report, proposal, contract, research, policy, financial, technical, ...",
  "key_topics": ["topic", "topic", "topic"],
  "has_numeric_data": true,
  "has_comparative_content": false,
  "analysis_suggestions": [
    {"type": "summarize", "relevance": 0.95, "reason": "Why it fits", "output_preview": "What the user gets"}
  ],
  "chart_suggestions": [
    {"type": "bar", "relevance": 0.9, "reason": "Why it fits", "data_description": "Data to plot"}
  ],
  "suggested_questions": ["Question worth asking"],
  "compare_suggestions": {
    "good_to_compare_with": ["Kinds of documents"],
    "comparison_criteria": ["Criterion"]
  },
  "decision_matrix_suggestions": {
    "suitable_for_matrix": false,
    "suggested_criteria": [{"name": "Criterion", "weight": 0.3, "description": "What to evaluate"}]
  },
  "user_intent_keywords": {
    "financial": ["budget", "cost"],
    "compliance": ["regulation", "policy"],
    "technical": ["specification", "architecture"],
    "strategic": ["goal", "strategy"]
  }
}
"analysis_suggestions" must contain one entry for each of summarize, pros_cons, gaps_risks, upgrade, report and slides, with relevance between 0.0 and 1.0."#;

pub const COMPARE_TWO: &str = r#"Compare the two documents in depth. Answer with a JSON object of this shape:
{
  "document1": {"name": "Name", "summary": "Summary", "key_points": ["point"]},
  "document2": {"name": "Name", "summary": "Summary", "key_points": ["point"]},
  "comparison_table": [
    {"aspect": "Scope, Coverage, Data Quality, ...", "document1_value": "Value", "document2_value": "Value", "difference": "Key difference", "better": "document1|document2|equal"}
  ],
  "detailed_differences": [
    {
      "category": "Content, Structure, Data, ...",
      "type": "added|removed|modified|different",
      "severity": "high|medium|low",
      "description": "Difference",
      "document1_detail": "What document 1 has",
      "document2_detail": "What document 2 has",
      "impact": "Impact"
    }
  ],
  "similarity_score": 75,
  "strengths_doc1": ["Strength"],
  "strengths_doc2": ["Strength"],
  "weaknesses_doc1": ["Weakness"],
  "weaknesses_doc2": ["Weakness"],
  "best_version": "document1|document2",
  "best_version_reason": "Why",
  "recommendation": "Which document to use and why"
}"#;

pub const COMPARE_MANY: &str = r#"Compare all of the documents in depth. Answer with a JSON object of this shape:
{
  "documents": [
    {"id": 1, "name": "filename", "summary": "Summary", "key_points": ["point"], "quality_score": 80}
  ],
  "comparison_table": [
    {"aspect": "Aspect", "values": {"doc1": "value", "doc2": "value", "doc3": "value"}, "best": "doc1|doc2|doc3"}
  ],
  "detailed_differences": [
    {"category": "Category", "description": "What differs", "by_document": {"doc1": "detail", "doc2": "detail"}, "severity": "high|medium|low"}
  ],
  "strengths_by_document": {"doc1": ["strength"], "doc2": ["strength"]},
  "weaknesses_by_document": {"doc1": ["weakness"], "doc2": ["weakness"]},
  "ranking": [
    {"rank": 1, "document": "name", "score": 85, "reason": "Why"}
  ],
  "best_candidate": {"name": "filename", "reason": "Why", "key_advantages": ["Advantage"]},
  "recommendation": "Final recommendation"
}"#;

const DECISION_MATRIX: &str = r#"Score every document against every criterion. Criteria: $CRITERIA

Answer with a JSON object of this shape:
{
  "criteria": [{"name": "Criterion", "weight": 0.3, "description": "What it measures"}],
  "options": [
    {
      "option_id": 1,
      "name": "Document name",
      "summary": "Summary",
      "scores": [
        {"criterion": "Criterion", "score": 8, "max_score": 10, "weighted_score": 2.4, "reason": "Why this score", "evidence": "Evidence from the document"}
      ],
      "total_weighted_score": 7.5,
      "strengths": ["Strength"],
      "weaknesses": ["Weakness"],
      "key_findings": ["Finding"]
    }
  ],
  "comparison_by_criterion": [
    {
      "criterion": "Criterion",
      "weight": 0.3,
      "scores_by_document": [{"document": "Name", "score": 8, "reason": "Why"}],
      "best_performer": "Name",
      "analysis": "How the documents compare"
    }
  ],
  "ranking": [
    {"rank": 1, "document": "Name", "total_score": 8.2, "percentage": 82, "summary": "Why"}
  ],
  "winner": {
    "name": "Name",
    "total_score": 8.2,
    "percentage": 82,
    "reason": "Why it wins",
    "key_advantages": ["Advantage"],
    "considerations": "Caveats"
  },
  "recommendation": "Final recommendation"
}
Scores run from 0 to 10. A weighted score is score multiplied by weight."#;

pub fn chart(chart_type: &str) -> String {
    CHART.replace("$CHART_TYPE", chart_type)
}

/// `criteria_json` is the serialized criteria list.
pub fn decision_matrix(criteria_json: &str) -> String {
    DECISION_MATRIX.replace("$CRITERIA", criteria_json)
}
