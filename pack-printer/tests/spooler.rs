// pack-printer/tests/spooler.rs
// Label download + raw printing end to end

use axum::{Router, http::StatusCode, routing::get};
use pack_printer::{LabelSpooler, NetworkPrinter, PrinterRegistry};
use shared::PrintSpooler;
use shared::error::ErrorCode;
use tokio::io::AsyncReadExt;
use tokio::net::TcpListener;

const LABEL: &[u8] = b"^XA^FO50,50^FD1Z999AA10123456784^FS^XZ";

async fn spawn_label_server() -> String {
    let app = Router::new()
        .route("/labels/ok.zpl", get(|| async { LABEL.to_vec() }))
        .route("/labels/missing.zpl", get(|| async { StatusCode::NOT_FOUND }));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn spawn_printer() -> (String, tokio::task::JoinHandle<Vec<u8>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = Vec::new();
        socket.read_to_end(&mut buf).await.unwrap();
        buf
    });
    (addr.to_string(), handle)
}

#[tokio::test]
async fn test_label_reaches_printer() {
    let base = spawn_label_server().await;
    let (printer_addr, received) = spawn_printer().await;

    let mut registry = PrinterRegistry::new();
    registry
        .add("Zebra-1", NetworkPrinter::from_addr(&printer_addr).unwrap(), true)
        .unwrap();
    let spooler = LabelSpooler::new(registry).unwrap();

    let printers = spooler.list_printers().await.unwrap();
    assert_eq!(printers.len(), 1);
    assert!(printers[0].is_default);

    spooler
        .print_label(&format!("{}/labels/ok.zpl", base), "Zebra-1")
        .await
        .unwrap();
    assert_eq!(received.await.unwrap(), LABEL);
}

#[tokio::test]
async fn test_unknown_printer() {
    let spooler = LabelSpooler::new(PrinterRegistry::new()).unwrap();
    let err = spooler
        .print_label("http://127.0.0.1:1/x.zpl", "Nope")
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::PrinterNotAvailable);
}

#[tokio::test]
async fn test_missing_label_is_print_failure() {
    let base = spawn_label_server().await;
    let registry = PrinterRegistry::parse("Zebra-1=127.0.0.1:9").unwrap();
    let spooler = LabelSpooler::new(registry).unwrap();

    let err = spooler
        .print_label(&format!("{}/labels/missing.zpl", base), "Zebra-1")
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::PrintFailed);
    assert!(err.message.contains("404"));
}
